//! Restore commands, delegated to the backup manager script

use super::backup::BackupManagerCommand;

pub fn restore() -> BackupManagerCommand {
    BackupManagerCommand::new("restore", "Restore Columnstore (and/or MariaDB) data.")
}

pub fn dbrm_restore() -> BackupManagerCommand {
    BackupManagerCommand::new("dbrm_restore", "Restore Columnstore DBRM data.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_match_script_commands() {
        assert_eq!(restore().operation(), "restore");
        assert_eq!(dbrm_restore().operation(), "dbrm_restore");
    }
}
