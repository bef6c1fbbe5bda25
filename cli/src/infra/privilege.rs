//! Effective-uid check for the privilege gate.

use anyhow::Result;

use crate::application::ports::PrivilegeProbe;

/// Reads the owner of `/proc/self`, which is the process's effective uid.
pub struct ProcPrivilege;

impl PrivilegeProbe for ProcPrivilege {
    #[cfg(unix)]
    fn is_superuser(&self) -> Result<bool> {
        use anyhow::Context;
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata("/proc/self").context("cannot determine effective uid")?;
        Ok(meta.uid() == 0)
    }

    #[cfg(not(unix))]
    fn is_superuser(&self) -> Result<bool> {
        Ok(false)
    }
}
