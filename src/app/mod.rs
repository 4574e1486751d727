//! Export orchestration: walk the archive, convert each chat, write HTML.

pub mod config;

pub use config::{CliArgs, Config, ConfigError};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::archive::model::{Annotation, GroupInfo, Message, TasksData};
use crate::archive::timestamp::{self, Date, UtcOffset};
use crate::archive::{self, AttachmentKind, AttachmentResolver, ChatDir, UserIdentity};
use crate::document::html::{self, RenderOptions};
use crate::document::{Block, Document};
use crate::error::ExportError;
use crate::sanitize;
use crate::shape::Reshaper;

pub struct App {
    config: Config,
    reshaper: Reshaper,
    render_options: RenderOptions,
    time_zone: UtcOffset,
    start_date: Option<Date>,
    end_date: Option<Date>,
    /// Extensions already reported as having no thumbnail preview.
    unknown_exts: HashSet<String>,
}

impl App {
    pub fn new(config: Config) -> Result<Self, ExportError> {
        if !config.in_dir.is_dir() {
            return Err(ExportError::InputDirMissing(config.in_dir.clone()));
        }
        fs::create_dir_all(&config.out_dir).map_err(|source| ExportError::OutputDirUnusable {
            path: config.out_dir.clone(),
            source,
        })?;
        let reshaper = Reshaper::new(config.max_line_width)?;
        let render_options = RenderOptions {
            page: config.effective_page_size(),
            max_img_height_px: config.max_img_height_px(),
        };
        let time_zone = config.effective_time_zone();
        let start_date = config.effective_start_date();
        let end_date = config.effective_end_date();
        log::info!("Init success");
        Ok(App {
            config,
            reshaper,
            render_options,
            time_zone,
            start_date,
            end_date,
            unknown_exts: HashSet::new(),
        })
    }

    /// Export every chat in the archive.
    pub fn run(&mut self) -> Result<(), ExportError> {
        let user = archive::load_user_identity(&self.config.in_dir)?;
        log::info!("You are {} ({})", user.name, user.email);

        let chats = archive::chat_dirs(&self.config.in_dir)?;
        log::info!("Found {} chats/spaces, generating output", chats.len());
        let total = chats.len();
        for (i, chat) in chats.iter().enumerate() {
            if let Err(e) = self.export_chat(chat, &user) {
                log::error!("Skipping {}: {e}", chat.name());
            }
            eprint!("\r{}%", i * 100 / total.max(1));
        }
        eprintln!("\r100%");
        Ok(())
    }

    /// Convert one chat directory into an HTML transcript on disk.
    ///
    /// The file is only written when the chat has at least one message in
    /// the configured date range and the exporting user participated (or
    /// `include_all` is set).
    fn export_chat(&mut self, chat: &ChatDir, user: &UserIdentity) -> Result<(), ExportError> {
        let Some(message_file) = archive::load_messages(&chat.path)? else {
            log::debug!("{}: no messages", chat.name());
            return Ok(());
        };
        let group_info = archive::load_group_info(&chat.path)?;
        let title = group_info.name.clone().unwrap_or_else(|| "Chat".to_string());
        let file_name = self.output_file_name(&title, &group_info, user);

        let mut blocks = vec![Block::Participants {
            entries: participant_entries(&group_info, user),
        }];
        let mut resolver = AttachmentResolver::new();
        let mut participated = false;
        let mut any_in_range = false;

        for msg in &message_file.messages {
            if msg.is_deleted() {
                continue;
            }
            let (timestamp_str, date) = self.local_timestamp(msg, chat);
            if let Some(date) = date {
                if self.start_date.is_some_and(|start| date < start)
                    || self.end_date.is_some_and(|end| date > end)
                {
                    continue;
                }
            }
            any_in_range = true;
            let from_me = msg.creator.name == user.name;
            if from_me {
                participated = true;
            }
            blocks.push(Block::Header {
                author: msg.creator.name.clone(),
                email: msg.creator.email.clone(),
                timestamp: timestamp_str,
                from_me,
            });
            self.convert_body(msg, from_me, chat, &mut resolver, &mut blocks);
        }

        if any_in_range && (participated || self.config.include_all) {
            let doc = Document { title, blocks };
            let rendered = html::render(&doc, &self.render_options);
            let out_path = self.config.out_dir.join(file_name);
            fs::write(&out_path, rendered).map_err(|source| ExportError::WriteFile {
                path: out_path.clone(),
                source,
            })?;
            log::debug!("Wrote {}", out_path.display());
        }
        Ok(())
    }

    /// Zone-adjusted display timestamp plus the civil date used for the
    /// range filter. A timestamp that fails to parse is shown raw and is
    /// exempt from filtering; it never aborts the chat.
    fn local_timestamp(&self, msg: &Message, chat: &ChatDir) -> (String, Option<Date>) {
        match timestamp::parse_created_date(&msg.created_date) {
            Ok(utc) => {
                let local = utc.with_offset(self.time_zone);
                (format!("{local} {}", self.time_zone), Some(local.date()))
            }
            Err(e) => {
                log::warn!("{}: {e}", chat.name());
                (msg.created_date.clone(), None)
            }
        }
    }

    fn convert_body(
        &mut self,
        msg: &Message,
        from_me: bool,
        chat: &ChatDir,
        resolver: &mut AttachmentResolver,
        blocks: &mut Vec<Block>,
    ) {
        if let Some(text) = &msg.text {
            let shaped = self.reshaper.shape(text);
            blocks.push(Block::Text {
                text: shaped.text,
                rtl: shaped.contains_rtl,
                from_me,
            });
        } else if !msg.attached_files.is_empty() {
            for file in &msg.attached_files {
                let path = resolver.resolve(&chat.path, &file.export_name);
                self.convert_attachment(&path, from_me, blocks);
            }
        } else if let Some(first) = msg.annotations.first() {
            self.convert_annotation(first, from_me, blocks);
        } else {
            log::warn!("Message from {} has unknown content", msg.creator.name);
        }
    }

    fn convert_attachment(&mut self, path: &Path, from_me: bool, blocks: &mut Vec<Block>) {
        let href = path.display().to_string();
        let kind = AttachmentKind::from_path(path);
        match kind {
            AttachmentKind::Image => {
                blocks.push(Block::Image {
                    src: href.clone(),
                    link: href,
                });
            }
            AttachmentKind::Pdf | AttachmentKind::Other => {
                if kind == AttachmentKind::Other {
                    let ext = path
                        .extension()
                        .map(|e| e.to_string_lossy().to_ascii_lowercase())
                        .unwrap_or_default();
                    if self.unknown_exts.insert(ext.clone()) {
                        log::warn!("File extension '{ext}' without a thumbnail preview found");
                    }
                }
                let label = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| href.clone());
                blocks.push(Block::FileLink {
                    href,
                    label,
                    from_me,
                });
            }
        }
    }

    fn convert_annotation(&self, ann: &Annotation, from_me: bool, blocks: &mut Vec<Block>) {
        if ann.video_call_metadata.is_some() {
            blocks.push(Block::Notice {
                text: "Video call started.".to_string(),
                from_me,
            });
        } else if let Some(gsuite) = &ann.gsuite_integration_metadata {
            if let Some(call) = &gsuite.call_data {
                blocks.push(Block::Notice {
                    text: call.call_status.clone(),
                    from_me,
                });
            } else if let Some(tasks) = &gsuite.tasks_data {
                blocks.push(Block::Notice {
                    text: task_sentence(tasks),
                    from_me,
                });
            } else {
                log::warn!("Unknown type under gsuite_integration_metadata");
            }
        } else if let Some(url) = &ann.url_metadata {
            blocks.push(Block::Image {
                src: url.image_url.clone(),
                link: url.image_url.clone(),
            });
        } else if let Some(drive) = &ann.drive_metadata {
            blocks.push(Block::Notice {
                text: format!(
                    "File shared from google drive: {} (file id: {})",
                    drive.title, drive.id
                ),
                from_me,
            });
        } else {
            log::warn!("Unknown type under annotations");
        }
    }

    /// `"<title> with <p1>, <p2>, ….html"`, scrubbed and length-capped.
    /// Participant names are appended only while the name stays under the
    /// configured maximum.
    fn output_file_name(&self, title: &str, group: &GroupInfo, user: &UserIdentity) -> String {
        let mut name = format!("{title} with");
        let mut first = true;
        for member in &group.members {
            if member.name == user.name {
                continue;
            }
            let sep = if first { " " } else { ", " };
            if name.chars().count() + sep.len() + member.name.chars().count()
                < self.config.max_filename_len
            {
                name.push_str(sep);
                name.push_str(&member.name);
                first = false;
            }
        }
        let name = sanitize::sanitize_file_name(&name);
        let name = sanitize::truncate_graphemes(&name, self.config.max_filename_len);
        format!("{name}.html")
    }
}

/// Roster entries shown under the title, the exporting user first.
fn participant_entries(group: &GroupInfo, user: &UserIdentity) -> Vec<String> {
    let mut entries = vec![format!("{} ({})", user.name, user.email)];
    for member in &group.members {
        if member.name == user.name {
            continue;
        }
        match &member.email {
            Some(email) => entries.push(format!("{} ({email})", member.name)),
            None => entries.push(member.name.clone()),
        }
    }
    entries
}

/// One-line summary of a task annotation.
fn task_sentence(tasks: &TasksData) -> String {
    let props = &tasks.task_properties;
    let mut sentence = format!("Task \"{}\"", props.title);
    if let Some(assignee) = &props.assignee {
        sentence.push_str(&format!(" assigned to {}", assignee.id));
    }
    if let Some(change) = &tasks.assignee_change {
        sentence.push_str(&format!(" removed from {}", change.old_assignee.id));
    }
    if props.completed {
        sentence.push_str(" completed.");
    } else if props.deleted {
        sentence.push_str(" deleted.");
    } else {
        sentence.push('.');
    }
    sentence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::model::{Member, TaskProperties, UserId};

    fn user() -> UserIdentity {
        UserIdentity {
            name: "Dana Levi".to_string(),
            email: "dana@example.com".to_string(),
        }
    }

    fn group(members: Vec<(&str, Option<&str>)>) -> GroupInfo {
        GroupInfo {
            name: None,
            members: members
                .into_iter()
                .map(|(name, email)| Member {
                    name: name.to_string(),
                    email: email.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_participant_entries_user_first() {
        let group = group(vec![
            ("Bob", Some("bob@example.com")),
            ("Dana Levi", Some("dana@example.com")),
            ("Carol", None),
        ]);
        let entries = participant_entries(&group, &user());
        assert_eq!(
            entries,
            vec![
                "Dana Levi (dana@example.com)".to_string(),
                "Bob (bob@example.com)".to_string(),
                "Carol".to_string(),
            ]
        );
    }

    #[test]
    fn test_task_sentence_variants() {
        let base = TaskProperties {
            title: "Buy milk".to_string(),
            completed: false,
            deleted: false,
            assignee: None,
        };
        let tasks = TasksData {
            task_properties: base.clone(),
            assignee_change: None,
        };
        assert_eq!(task_sentence(&tasks), "Task \"Buy milk\".");

        let tasks = TasksData {
            task_properties: TaskProperties {
                completed: true,
                assignee: Some(UserId {
                    id: "users/123".to_string(),
                }),
                ..base.clone()
            },
            assignee_change: None,
        };
        assert_eq!(
            task_sentence(&tasks),
            "Task \"Buy milk\" assigned to users/123 completed."
        );

        let tasks = TasksData {
            task_properties: TaskProperties {
                deleted: true,
                ..base
            },
            assignee_change: Some(crate::archive::model::AssigneeChange {
                old_assignee: UserId {
                    id: "users/9".to_string(),
                },
            }),
        };
        assert_eq!(
            task_sentence(&tasks),
            "Task \"Buy milk\" removed from users/9 deleted."
        );
    }

    #[test]
    fn test_output_file_name_caps_participants() {
        let config = Config {
            max_filename_len: 30,
            ..Config::default()
        };
        let app = test_app(config);
        let group = group(vec![
            ("Bob", None),
            ("A very long participant name indeed", None),
            ("Eve", None),
        ]);
        let name = app.output_file_name("Chat", &group, &user());
        // The long name does not fit; the short ones do.
        assert_eq!(name, "Chat with Bob, Eve.html");
    }

    #[test]
    fn test_output_file_name_sanitized() {
        let app = test_app(Config::default());
        let name = app.output_file_name("Q/A: stuff", &group(vec![("Bob", None)]), &user());
        assert_eq!(name, "Q-A- stuff with Bob.html");
    }

    fn test_app(config: Config) -> App {
        App {
            reshaper: Reshaper::new(config.max_line_width).unwrap(),
            render_options: RenderOptions::default(),
            time_zone: UtcOffset::UTC,
            start_date: None,
            end_date: None,
            unknown_exts: HashSet::new(),
            config,
        }
    }
}
