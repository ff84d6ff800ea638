use skylark_install_core::{InstallConfig, Installer, PatchOutcome};

mod cli;

fn main() {
    let args = cli::parse_args();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    // Installs land in the invoking user's home; running under sudo is
    // almost always a mistake, but not one worth refusing outright
    #[cfg(unix)]
    {
        if unsafe { libc::geteuid() } == 0 {
            log::warn!(
                "running as root: skylark will be installed under root's home directory, \
                 not a regular user's"
            );
        }
    }

    println!("==================================================");
    println!("  Skylark CLI Installer v{}", env!("CARGO_PKG_VERSION"));
    println!("==================================================\n");

    let config = InstallConfig {
        version: args.version,
        assume_yes: args.yes,
        upgrade_in_place: args.upgrade,
    };

    match Installer::new(config).run() {
        Ok(report) => {
            println!("\n==================================================");
            println!("  Installation Complete!");
            println!("==================================================\n");
            println!("Installed:  skylark {}", report.version);
            println!("Location:   {}", report.executable.display());
            println!("Runtimes:   {} / {}", report.node.describe(), report.python.describe());
            match report.path_registration {
                PatchOutcome::Added => {
                    println!("\nPATH was updated. Restart your terminal, then run: skylark --help");
                }
                PatchOutcome::AlreadyPresent => {
                    println!("\nRun: skylark --help");
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
