//! CLI front end: line commands that drive a [`FormSession`].

use crate::error::Result;
use crate::form::{
    DocumentsPatch, FileRef, FormSession, FormStep, Section, SectionPatch, StepOutcome,
};

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  show                              current step and data
  errors                            visible validation errors
  set <section> <field> <value...>  update a text field
  attach <slot> <name> <bytes>      attach a file to idProof, transcripts, or recommendations
  touch <section> <field>           validate one field
  check                             validate every field on this step
  next | back                       move between steps
  save | discard                    write or delete the draft
  submit                            finish from the review step
  review                            print the application summary
  quit";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Errors,
    Set {
        section: Section,
        field: String,
        value: String,
    },
    Attach {
        slot: String,
        file: FileRef,
    },
    Touch {
        section: Section,
        field: String,
    },
    Check,
    Next,
    Back,
    Save,
    Discard,
    Submit,
    Review,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Command, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };

        let command = match verb {
            "show" => Command::Show,
            "errors" => Command::Errors,
            "set" => {
                let section = parse_section(words.next())?;
                let field = words.next().ok_or("usage: set <section> <field> <value...>")?;
                let value = words.collect::<Vec<_>>().join(" ");
                Command::Set {
                    section,
                    field: field.to_string(),
                    value,
                }
            }
            "attach" => {
                let usage = "usage: attach <slot> <name> <bytes>";
                let slot = words.next().ok_or(usage)?;
                let name = words.next().ok_or(usage)?;
                let size = words
                    .next()
                    .ok_or(usage)?
                    .parse::<u64>()
                    .map_err(|e| format!("invalid size: {e}"))?;
                Command::Attach {
                    slot: slot.to_string(),
                    file: FileRef::new(name, size),
                }
            }
            "touch" => {
                let section = parse_section(words.next())?;
                let field = words.next().ok_or("usage: touch <section> <field>")?;
                Command::Touch {
                    section,
                    field: field.to_string(),
                }
            }
            "check" => Command::Check,
            "next" => Command::Next,
            "back" => Command::Back,
            "save" => Command::Save,
            "discard" => Command::Discard,
            "submit" => Command::Submit,
            "review" => Command::Review,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "/quit" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(command)
    }
}

fn parse_section(word: Option<&str>) -> std::result::Result<Section, String> {
    word.ok_or_else(|| "missing section".to_string())?.parse()
}

/// Run one command and return the text to print.
///
/// `Quit` is handled by the caller and prints nothing here.
pub async fn execute(session: &mut FormSession, command: Command) -> Result<String> {
    let output = match command {
        Command::Show => render_state(session),
        Command::Errors => render_errors(session),
        Command::Set {
            section,
            field,
            value,
        } => {
            if section == Section::Documents {
                return Ok("use `attach` for document slots".to_string());
            }
            let mut fields = serde_json::Map::new();
            fields.insert(field.clone(), serde_json::Value::String(value));
            let patch = SectionPatch::from_json(section, serde_json::Value::Object(fields))?;
            session.update_field(patch);
            format!("{section}.{field} updated")
        }
        Command::Attach { slot, file } => {
            let patch = match slot.as_str() {
                "idProof" => DocumentsPatch {
                    id_proof: Some(file),
                    ..Default::default()
                },
                "transcripts" | "recommendations" => {
                    let mut files = if slot == "transcripts" {
                        session.data().documents.transcripts.clone()
                    } else {
                        session.data().documents.recommendations.clone()
                    };
                    files.push(file);
                    if slot == "transcripts" {
                        DocumentsPatch {
                            transcripts: Some(files),
                            ..Default::default()
                        }
                    } else {
                        DocumentsPatch {
                            recommendations: Some(files),
                            ..Default::default()
                        }
                    }
                }
                other => return Ok(format!("unknown document slot: {other}")),
            };
            session.update_field(patch);
            session.touch_and_validate_field(Section::Documents, &slot);
            render_errors(session)
        }
        Command::Touch { section, field } => {
            if !section.fields().contains(&field.as_str()) {
                return Ok(format!("unknown field {field} in {section}"));
            }
            session.touch_and_validate_field(section, &field);
            render_errors(session)
        }
        Command::Check => {
            if session.validate_current_step_all_fields() {
                "step is valid".to_string()
            } else {
                render_errors(session)
            }
        }
        Command::Next => match session.advance_step() {
            StepOutcome::Advanced(step) => format!("now on {}", describe(step)),
            StepOutcome::ReadyToSubmit => "all set, use `submit`".to_string(),
            _ => format!(
                "please fix the validation errors before proceeding\n{}",
                render_errors(session)
            ),
        },
        Command::Back => format!("now on {}", describe(session.retreat_step())),
        Command::Save => {
            session.save_draft().await?;
            "draft saved".to_string()
        }
        Command::Discard => {
            session.discard_draft().await?;
            "draft discarded".to_string()
        }
        Command::Submit => match session.submit().await? {
            StepOutcome::Submitted => "application submitted".to_string(),
            _ if !session.current_step().is_last() => {
                "finish every step before submitting".to_string()
            }
            _ => render_errors(session),
        },
        Command::Review => session.summary().to_markdown(),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(output)
}

fn describe(step: FormStep) -> String {
    format!("step {} of {}: {}", step.index() + 1, FormStep::ALL.len(), step.label())
}

fn render_state(session: &FormSession) -> String {
    let data = session.data();
    let mut lines = vec![describe(session.current_step())];
    let basic = &data.basic_details;
    for (name, value) in [
        ("firstName", &basic.first_name),
        ("lastName", &basic.last_name),
        ("email", &basic.email),
        ("phone", &basic.phone),
        ("dateOfBirth", &basic.date_of_birth),
        ("address", &basic.address),
    ] {
        lines.push(format!("  basicDetails.{name} = {value:?}"));
    }
    let academic = &data.academic_details;
    lines.push(format!("  academicDetails.highSchoolName = {:?}", academic.high_school_name));
    lines.push(format!("  academicDetails.highSchoolGrade = {:?}", academic.high_school_grade));
    let summary = session.summary();
    lines.push(format!("  documents.idProof: {}", summary.id_proof));
    lines.push(format!("  documents.transcripts: {}", summary.transcripts));
    lines.push(format!("  documents.recommendations: {}", summary.recommendations));
    if data.is_complete {
        lines.push("  (submitted)".to_string());
    }
    lines.join("\n")
}

fn render_errors(session: &FormSession) -> String {
    if session.errors().is_empty() {
        return "no errors".to_string();
    }
    session
        .errors()
        .iter()
        .map(|(field, message)| format!("  {field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::FormConfig;
    use crate::store::MemoryStore;

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("next").unwrap(), Command::Next);
        assert_eq!(Command::parse("  quit ").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse("set basicDetails address 12 Main  Street").unwrap(),
            Command::Set {
                section: Section::BasicDetails,
                field: "address".into(),
                value: "12 Main Street".into(),
            }
        );
        assert_eq!(
            Command::parse("attach idProof id.pdf 2048").unwrap(),
            Command::Attach {
                slot: "idProof".into(),
                file: FileRef::new("id.pdf", 2048),
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("fly").is_err());
        assert!(Command::parse("set photos x y").is_err());
        assert!(Command::parse("attach idProof id.pdf lots").is_err());
        assert!(Command::parse("touch basicDetails").is_err());
    }

    #[tokio::test]
    async fn drives_a_session() {
        let store = Arc::new(MemoryStore::new());
        let mut session = FormSession::initialize(store.clone(), FormConfig::default()).await;

        let out = execute(&mut session, Command::Next).await.unwrap();
        assert!(out.contains("Basic Details"));

        let out = execute(&mut session, Command::parse("set basic email nope").unwrap())
            .await
            .unwrap();
        assert_eq!(out, "basicDetails.email updated");

        let out = execute(&mut session, Command::parse("touch basic email").unwrap())
            .await
            .unwrap();
        assert!(out.contains("Invalid email format"));

        let out = execute(&mut session, Command::parse("touch basic photo").unwrap())
            .await
            .unwrap();
        assert_eq!(out, "unknown field photo in basicDetails");
        assert!(!session.validated_fields().contains("photo"));

        let out = execute(&mut session, Command::Next).await.unwrap();
        assert!(out.contains("please fix"));
        assert!(out.contains("firstName: First name is required"));

        execute(&mut session, Command::Save).await.unwrap();
        assert_eq!(store.len().await, 1);
        execute(&mut session, Command::Discard).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn attach_appends_and_validates() {
        let mut session =
            FormSession::initialize(Arc::new(MemoryStore::new()), FormConfig::default()).await;
        execute(&mut session, Command::parse("attach transcripts a.pdf 10").unwrap())
            .await
            .unwrap();
        let out = execute(&mut session, Command::parse("attach transcripts b.pdf 9999999").unwrap())
            .await
            .unwrap();
        assert_eq!(session.data().documents.transcripts.len(), 2);
        assert!(out.contains("Some transcript files exceed 5MB limit"));

        let out = execute(&mut session, Command::parse("attach photo p.png 1").unwrap())
            .await
            .unwrap();
        assert!(out.contains("unknown document slot"));
    }
}
