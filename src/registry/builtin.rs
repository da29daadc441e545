// src/registry/builtin.rs

//! The compiled-in action table.
//!
//! Program names and arguments here are plain data; a TOML config can
//! replace any entry without touching the coordinator or the runners.

use crate::registry::action::{Action, Step};
use crate::types::ProgressKind;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn run(program: &str, list: &[&str], progress: Option<ProgressKind>) -> Step {
    Step::RunCommand {
        program: program.to_string(),
        args: args(list),
        progress,
    }
}

fn call(program: &str, list: &[&str]) -> Step {
    Step::FixedCall {
        program: program.to_string(),
        args: args(list),
        detach: false,
    }
}

fn launch(program: &str) -> Step {
    Step::FixedCall {
        program: program.to_string(),
        args: Vec::new(),
        detach: true,
    }
}

/// Every built-in action, in display order.
pub fn builtin_actions() -> Vec<Action> {
    vec![
        Action::new(
            "system-file-check",
            "Scan and repair protected system files",
            vec![run("sfc", &["/scannow"], Some(ProgressKind::VerifyStyle))],
        ),
        Action::new(
            "restore-health",
            "Repair the component store of the running image",
            vec![run(
                "DISM.exe",
                &["/Online", "/Cleanup-image", "/Restorehealth"],
                Some(ProgressKind::ImageRestoreStyle),
            )],
        ),
        Action::new(
            "disk-scan",
            "Check the system drive for file system errors",
            vec![run("chkdsk", &["C:"], None)],
        ),
        Action::new(
            "defrag",
            "Optimize the system drive",
            vec![run("defrag", &["C:", "/O"], None)],
        ),
        Action::new(
            "clear-temp",
            "Delete everything in the temporary-files directory",
            vec![Step::BulkDelete {
                path: "{temp}".to_string(),
            }],
        ),
        Action::new(
            "clear-update-cache",
            "Stop the update services, purge their download cache, start them again",
            vec![
                call("net", &["stop", "wuauserv"]),
                call("net", &["stop", "bits"]),
                Step::BulkDelete {
                    path: "{windir}/SoftwareDistribution/Download".to_string(),
                },
                call("net", &["start", "wuauserv"]),
                call("net", &["start", "bits"]),
            ],
        ),
        Action::new(
            "reset-icon-cache",
            "Stop the shell, delete the icon cache database, relaunch the shell",
            vec![
                call("taskkill", &["/f", "/im", "explorer.exe"]),
                Step::RemoveFile {
                    path: "{local_data}/IconCache.db".to_string(),
                },
                launch("explorer.exe"),
            ],
        ),
        Action::new(
            "set-safe-boot",
            "Boot into minimal safe mode on next restart",
            vec![call("bcdedit", &["/set", "{current}", "safeboot", "minimal"])],
        ),
        Action::new(
            "clear-safe-boot",
            "Boot normally on next restart",
            vec![call("bcdedit", &["/deletevalue", "{current}", "safeboot"])],
        ),
        Action::new(
            "registry-cleaner",
            "Open the bundled registry cleaner",
            vec![launch("{exe_dir}/Little Registry Cleaner.exe")],
        ),
        Action::new(
            "startup-manager",
            "Open the bundled startup manager",
            vec![launch("{exe_dir}/Little Startup Manager.exe")],
        ),
        Action::new(
            "uninstall-manager",
            "Open the bundled uninstall manager",
            vec![launch("{exe_dir}/Little Uninstall Manager.exe")],
        ),
        Action::new(
            "restart",
            "Restart the computer now",
            vec![call("shutdown", &["/r", "/t", "0"])],
        ),
        Action::new(
            "shutdown",
            "Shut the computer down now",
            vec![call("shutdown", &["/s", "/t", "0"])],
        ),
    ]
}
