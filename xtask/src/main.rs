//! The softvga build tool

static HELP_TEXT: &str = r#"
The softvga build tool version $CARGO_PKG_VERSION.

$CARGO_PKG_LICENSE

Options:

  * "help" - print this help text
  * "test" - run the host-side tests
  * "build-embedded" - check the library builds for a no_std target
  * "fmt" - format the code
  * "fmt-check" - check the code is formatted
  * "clippy" - run clippy on the library and the build tool
"#;

/// A bare-metal target with compare-and-swap atomics.
const EMBEDDED_TARGET: &str = "thumbv7em-none-eabihf";

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Entry point to the program
///
/// We don't use anyhow or eyre here to keep the dependencies to a minimum
fn main() -> Result<()> {
    let command = std::env::args().nth(1).unwrap_or("help".to_string());
    match command.as_str() {
        "test" => {
            println!("Running tests...");
            cargo(&["test", "--package", "softvga"])?;
        }
        "build-embedded" => {
            println!("Building for {EMBEDDED_TARGET}...");
            get_target(EMBEDDED_TARGET)?;
            cargo(&[
                "build",
                "--package",
                "softvga",
                "--release",
                "--target",
                EMBEDDED_TARGET,
            ])?;
            cargo(&[
                "build",
                "--package",
                "softvga",
                "--release",
                "--target",
                EMBEDDED_TARGET,
                "--no-default-features",
                "--features",
                "defmt",
            ])?;
        }
        "fmt" => {
            println!("Running fmt...");
            cargo(&["fmt", "--all"])?;
        }
        "fmt-check" => {
            println!("Running fmt --check...");
            cargo(&["fmt", "--all", "--check"])?;
        }
        "clippy" => {
            println!("Running clippy...");
            cargo(&["clippy", "--workspace", "--all-targets"])?;
        }
        _ => {
            let help = HELP_TEXT.to_string();
            let help = help.replace("$CARGO_PKG_VERSION", env!("CARGO_PKG_VERSION"));
            let help = help.replace("$CARGO_PKG_LICENSE", env!("CARGO_PKG_LICENSE"));
            println!("{help}");
        }
    }
    Ok(())
}

/// Add our target to rustup
fn get_target(target: &str) -> Result<()> {
    let mut command = std::process::Command::new("rustup");
    command.arg("target");
    command.arg("add");
    command.arg(target);
    run_command(command)
}

/// Run a cargo command from the workspace root
fn cargo(args: &[&str]) -> Result<()> {
    let mut command = std::process::Command::new(env!("CARGO"));
    command.args(args);
    run_command(command)
}

/// Run a command to completion and check it worked OK
fn run_command(mut command: std::process::Command) -> Result<()> {
    if let Some(cwd) = command.get_current_dir() {
        println!("Running {command:?} in {cwd}", cwd = cwd.display());
    } else {
        println!("Running {command:?}");
    }
    let mut child = command.spawn()?;
    let status = child.wait()?;
    if !status.success() {
        return Err(Box::from("Command failed"));
    }
    Ok(())
}

// End of file
