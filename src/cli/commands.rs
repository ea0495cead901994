//! Command dispatch

use std::io::{self, Write};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{AuditSummary, Session, SessionCommand, TemplateOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::{output, render, CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Answer, DiagnosticNode, Position, QuestionMode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{Prompter, ScriptedPrompter, StdinPrompter};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.data_dir.as_deref())?;
    if let Some(locale) = &cli.locale {
        settings.locale = locale.clone();
    }
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Machines) => machines(&container),
        Some(Commands::Show { machine, template }) => show(&container, machine, *template),
        Some(Commands::Run { machine, answers }) => run(&container, machine, answers.as_deref()),
        Some(Commands::Check) => check(&container),
        Some(Commands::Config { command }) => config(&container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

#[instrument(skip(container))]
fn machines(container: &ServiceContainer) -> CliResult<()> {
    let machines = container.loader.machines()?;
    if machines.is_empty() {
        output::warning("machine index is empty");
    }
    for m in machines {
        match m.name {
            Some(name) => output::info(&format!("{}\t{}\t{}", m.id, m.template_id, name)),
            None => output::info(&format!("{}\t{}", m.id, m.template_id)),
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer, id: &str, is_template: bool) -> CliResult<()> {
    let tree = if is_template {
        container.loader.load_template(id)?
    } else {
        container.loader.resolve(id)?
    };
    output::info(&render::tree_view(&tree));
    Ok(())
}

#[instrument(skip(container))]
fn run(container: &ServiceContainer, machine: &str, answers: Option<&[String]>) -> CliResult<()> {
    let tree = Arc::new(container.loader.resolve(machine)?);
    let mut session = Session::new(machine, tree);

    let prompter: Box<dyn Prompter> = match answers {
        Some(script) => Box::new(ScriptedPrompter::new(script.iter().cloned())),
        None => Box::new(StdinPrompter),
    };

    let mut stdout = io::stdout();
    walk(&mut session, prompter.as_ref(), &mut stdout)?;

    let trail = session
        .state()
        .path()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    output::action("Path", &trail);
    Ok(())
}

/// User input during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Command(SessionCommand),
    Quit,
}

fn parse_input(line: &str, continue_only: bool) -> Option<Input> {
    let answer = |a| Some(Input::Command(SessionCommand::Answer(a)));
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => answer(Answer::Yes),
        "n" | "no" => answer(Answer::No),
        "c" | "continue" => answer(Answer::Continue),
        "" if continue_only => answer(Answer::Continue),
        "b" | "back" => Some(Input::Command(SessionCommand::Back)),
        "r" | "restart" => Some(Input::Command(SessionCommand::Restart)),
        "q" | "quit" => Some(Input::Quit),
        _ => None,
    }
}

/// Drive a session until the user quits or input runs out.
pub fn walk(session: &mut Session, prompter: &dyn Prompter, out: &mut dyn Write) -> CliResult<()> {
    loop {
        let view = session.view();
        render::position(out, &view).map_err(|e| InfraError::io("write output", e))?;

        let continue_only = matches!(
            view.position,
            Position::Node(DiagnosticNode::Question(q)) if q.mode == QuestionMode::ContinueOnly
        );
        let mut choices = match view.position {
            Position::Node(DiagnosticNode::Question(_)) if continue_only => vec!["[c]ontinue"],
            Position::Node(DiagnosticNode::Question(_)) => vec!["[y]es", "[n]o"],
            _ => Vec::new(),
        };
        if view.can_go_back {
            choices.push("[b]ack");
        }
        choices.extend(["[r]estart", "[q]uit"]);

        let Some(line) = prompter
            .read_line(&choices.join(" "))
            .map_err(InfraError::Prompt)?
        else {
            debug!("input exhausted at {}", session.state().current_id());
            return Ok(());
        };

        match parse_input(&line, continue_only) {
            Some(Input::Quit) => return Ok(()),
            Some(Input::Command(command)) => {
                if !session.apply(command) {
                    writeln!(out, "(nothing to do)").map_err(|e| InfraError::io("write output", e))?;
                }
            }
            None => {
                writeln!(out, "unrecognized input: {}", line)
                    .map_err(|e| InfraError::io("write output", e))?;
            }
        }
    }
}

#[instrument(skip(container))]
fn check(container: &ServiceContainer) -> CliResult<()> {
    let summary = container.audit.run();
    report_audit(&summary);
    match summary.problem_count() {
        0 => {
            output::success(&format!(
                "{} templates, {} machines: no problems",
                summary.templates.len(),
                summary.machines.len()
            ));
            Ok(())
        }
        n => Err(CliError::CheckFailed(n)),
    }
}

fn report_audit(summary: &AuditSummary) {
    if !summary.issues.is_empty() {
        output::header("Data directory");
        for issue in &summary.issues {
            output::failure(issue);
        }
    }

    output::header("Templates");
    for t in &summary.templates {
        let name = t.path.display();
        match &t.outcome {
            TemplateOutcome::Loaded {
                template_id,
                nodes,
                report,
            } if report.is_clean() => {
                output::success(&format!("{} ({}, {} nodes)", name, template_id, nodes))
            }
            TemplateOutcome::Loaded { report, .. } => {
                output::failure(&name);
                for finding in &report.findings {
                    output::detail(finding);
                }
            }
            TemplateOutcome::Failed { error } => {
                output::failure(&name);
                output::detail(error);
            }
        }
    }

    if !summary.machines.is_empty() {
        output::header("Machines");
        for m in &summary.machines {
            match &m.error {
                None => output::success(&format!("{} -> {}", m.machine.id, m.machine.template_id)),
                Some(error) => {
                    output::failure(&m.machine.id);
                    output::detail(error);
                }
            }
        }
    }
}

fn config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(&container.settings.data_dir).display());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("no global config directory on this platform".to_string())
            })?;
            if container.fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_blank_line_when_question_is_continue_only_then_continues() {
        assert_eq!(
            parse_input("", true),
            Some(Input::Command(SessionCommand::Answer(Answer::Continue)))
        );
        assert_eq!(parse_input("", false), None);
    }

    #[test]
    fn given_mixed_case_input_when_parsing_then_recognized() {
        assert_eq!(
            parse_input(" YES ", false),
            Some(Input::Command(SessionCommand::Answer(Answer::Yes)))
        );
        assert_eq!(parse_input("Q", false), Some(Input::Quit));
        assert_eq!(parse_input("maybe", false), None);
    }
}
