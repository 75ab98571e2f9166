//! Whole-invocation tests: a temporary Devfile, the real driver and task
//! registry, and a recording shell in place of real processes.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use clap::Parser;
use tempfile::{tempdir, TempDir};

use dev_cli::{Cli, Driver, Outcome};
use dev_exec::{CommandExecutor, CommandResult, ExecError, ExecutionContext, RunOptions, Shell};
use dev_tasks::RunError;

/// Answers every command with exit code 0 unless told otherwise.
#[derive(Default)]
struct RecordingShell {
    exit_codes: HashMap<String, i32>,
    commands: RefCell<Vec<String>>,
}

impl RecordingShell {
    fn failing(command: &str, code: i32) -> Self {
        let mut shell = Self::default();
        shell.exit_codes.insert(command.to_string(), code);
        shell
    }

    fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl Shell for RecordingShell {
    fn run(&self, ctx: &mut ExecutionContext, command: &str, options: RunOptions) -> dev_exec::Result<CommandResult> {
        self.commands.borrow_mut().push(command.to_string());
        ctx.merge_env(options.env);

        let code = self.exit_codes.get(command).copied().unwrap_or(0);
        if !options.allowed_exit_codes.contains(&code) {
            return Err(ExecError::Subprocess {
                code,
                command: command.to_string(),
            });
        }
        Ok(CommandResult {
            exit_code: code,
            output: options.capture.then(String::new),
        })
    }
}

fn project(devfile: &str) -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("Devfile"), devfile).unwrap();
    dir
}

fn context(vars: &[(&str, &str)]) -> ExecutionContext {
    let mut env: BTreeMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    env.insert("INVOKED_VIA_SHELL".to_string(), "1".to_string());
    ExecutionContext::from_env(env)
}

fn invoke(shell: &dyn Shell, dir: &Path, exec: &mut ExecutionContext, args: &[&str]) -> Outcome {
    let devfile = dir.join("Devfile");
    let mut argv = vec!["dev-bare", "-f", devfile.to_str().unwrap()];
    argv.extend_from_slice(args);

    let cli = Cli::parse_from(argv);
    Driver::new(shell).with_binary("dev-bare").run(&cli, exec)
}

const SHOP: &str = "\
name: shop
up:
  - run: docker compose up -d
  - env:
      APP_MODE: development
  - run:
      - make migrate
      - make seed
down:
  - run: docker compose down
commands:
  test:
    description: Run the test suite
    tasks:
      - run: py.test
  lint:
    - run: ruff check
    - run: mypy .
";

#[test]
fn test_up_runs_tasks_in_declared_order() {
    let dir = project(SHOP);
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["up"]);

    assert!(matches!(outcome, Outcome::Completed { steps: 3, .. }));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        shell.commands(),
        vec!["docker compose up -d", "make migrate", "make seed"]
    );
    assert_eq!(exec.var("APP_MODE"), Some("development"));
}

#[test]
fn test_down_runs_down_tasks_then_up_teardown() {
    let dir = project(SHOP);
    let shell = RecordingShell::default();
    let mut exec = context(&[("APP_MODE", "development")]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["down"]);

    assert!(matches!(outcome, Outcome::Completed { steps: 4, .. }));
    assert_eq!(shell.commands(), vec!["docker compose down"]);
    assert_eq!(exec.var("APP_MODE"), None);
}

#[test]
fn test_custom_command_receives_extra_args() {
    let dir = project(SHOP);
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["test", "--", "-k", "login"]);

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(shell.commands(), vec!["py.test -k login"]);
}

#[test]
fn test_failure_halts_the_plan() {
    let dir = project(SHOP);
    let shell = RecordingShell::failing("ruff check", 1);
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["lint"]);

    assert_eq!(outcome.exit_code(), 1);
    match outcome {
        Outcome::Failed {
            command,
            error: RunError::Exec(ExecError::Subprocess { code, command: failed }),
        } => {
            assert_eq!(command, "lint");
            assert_eq!(failed, "ruff check");
            assert_eq!(code, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(shell.commands(), vec!["ruff check"]);
}

#[test]
fn test_unknown_command_runs_nothing() {
    let dir = project(SHOP);
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["deploy"]);

    assert!(matches!(outcome, Outcome::CommandNotFound(ref name) if name == "deploy"));
    assert_eq!(outcome.exit_code(), 1);
    assert!(shell.commands().is_empty());
}

#[test]
fn test_unknown_task_runs_nothing() {
    let dir = project("name: shop\nup:\n  - run: make\n  - brew: postgresql\n  - run: make seed\n");
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["up"]);

    assert!(matches!(
        outcome,
        Outcome::Failed { error: RunError::TaskNotFound(ref name), .. } if name == "brew"
    ));
    assert!(shell.commands().is_empty());
}

#[test]
fn test_invalid_task_arguments() {
    let dir = project("name: shop\nup:\n  - env: [not, a, mapping]\n");
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["up"]);

    assert!(matches!(
        outcome,
        Outcome::Failed { error: RunError::Validation { ref task, .. }, .. } if task == "env"
    ));
    assert!(shell.commands().is_empty());
}

#[test]
fn test_broken_devfile_is_config_fault() {
    let dir = project("name: shop\nsetup:\n  - run: make\n");
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let outcome = invoke(&shell, dir.path(), &mut exec, &["up"]);

    assert!(matches!(outcome, Outcome::ConfigFault(_)));
    assert_eq!(outcome.exit_code(), 1);
    assert!(shell.commands().is_empty());
}

#[test]
fn test_missing_devfile_still_lists_commands() {
    let dir = tempdir().unwrap();
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    assert!(matches!(invoke(&shell, dir.path(), &mut exec, &[]), Outcome::Listed));
    assert!(matches!(invoke(&shell, dir.path(), &mut exec, &["--tasks"]), Outcome::Listed));
}

#[test]
fn test_internal_command_enqueues_bridge_directive() {
    let src = tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("github.com/acme/shop/.git")).unwrap();

    let dir = project(SHOP);
    let shell = RecordingShell::default();
    let mut exec = context(&[]);

    let cli = Cli::parse_from(["dev-bare", "-f", dir.path().join("Devfile").to_str().unwrap(), "cd", "shop"]);
    let mut registry = dev_tasks::TaskRegistry::new();
    registry.register(dev_tasks::TaskKind::Internal, dev_tasks::Cd::new().with_root(src.path()));

    let outcome = Driver::new(&shell).with_registry(registry).run(&cli, &mut exec);

    assert_eq!(outcome.exit_code(), 0);
    let expected = format!("cd {}", src.path().join("github.com/acme/shop").display());
    assert_eq!(exec.into_bridge().commands(), &[expected]);
}

#[test]
fn test_real_processes_stop_at_first_failure() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let devfile = format!(
        "name: shop\nup:\n  - run: printf a >> {out}\n  - run: exit 3\n  - run: printf c >> {out}\n",
        out = out.display()
    );
    std::fs::write(dir.path().join("Devfile"), devfile).unwrap();

    let shell = CommandExecutor::new();
    let mut exec = ExecutionContext::new();
    let outcome = invoke(&shell, dir.path(), &mut exec, &["up"]);

    assert!(matches!(
        outcome,
        Outcome::Failed { error: RunError::Exec(ExecError::Subprocess { code: 3, .. }), .. }
    ));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "a");
}
