use crate::error::{Result, TaskError};
use crate::task::{Task, TaskContext};

use super::single_arg;

const BINARY_PLACEHOLDER: &str = "{dev-bare}";
const BASH_SCRIPT: &str = include_str!("../../scripts/dev-init-bash.sh");
const ZSH_SCRIPT: &str = include_str!("../../scripts/dev-init-zsh.sh");

/// Shells with a wrapper script.
pub const SUPPORTED_SHELLS: [&str; 2] = ["bash", "zsh"];

/// Prints the shell wrapper that routes the bridge descriptor and evaluates
/// the queued directives.
pub struct Init;

impl Task for Init {
    type Args = Vec<String>;
    const NAME: &'static str = "init";
    const DESCRIPTION: &'static str = "Print the shell integration script";

    fn up(&self, args: Vec<String>, _ctx: &mut TaskContext<'_>) -> Result<()> {
        let shell = single_arg(args, "dev init <shell>")?;
        let script = render_init_script(&shell, &current_binary()).ok_or_else(|| {
            TaskError::failed(format!(
                "Could not init shell {}. Supported shells: {}",
                shell,
                SUPPORTED_SHELLS.join(", ")
            ))
        })?;

        print!("{}", script);
        Ok(())
    }
}

/// The wrapper script for `shell` with `binary` substituted, if supported.
pub fn render_init_script(shell: &str, binary: &str) -> Option<String> {
    let template = match shell {
        "bash" => BASH_SCRIPT,
        "zsh" => ZSH_SCRIPT,
        _ => return None,
    };
    Some(template.replace(BINARY_PLACEHOLDER, binary))
}

fn current_binary() -> String {
    std::env::current_exe()
        .ok()
        .map(|path| path.to_string_lossy().into_owned())
        .or_else(|| std::env::args().next())
        .unwrap_or_else(|| "dev-bare".to_string())
}
