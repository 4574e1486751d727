//! Typed models for the archive's JSON files.
//!
//! Only the fields the exporter consumes are modeled; everything else in
//! the export is ignored during deserialization. Optionality mirrors what
//! real Takeout archives do: group names and member emails are sometimes
//! absent, message content is exactly one of text / attachments /
//! annotations.

use serde::Deserialize;

const MSG_STATE_DELETED: &str = "DELETED";

/// `Users/<subdir>/user_info.json`
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoFile {
    pub user: UserInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

/// `group_info.json`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `messages.json`
#[derive(Debug, Clone, Deserialize)]
pub struct MessageFile {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub creator: Member,
    pub created_date: String,
    #[serde(default)]
    pub message_state: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attached_files: Vec<AttachedFile>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Message {
    pub fn is_deleted(&self) -> bool {
        self.message_state.as_deref() == Some(MSG_STATE_DELETED)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachedFile {
    pub export_name: String,
}

/// One entry of a message's `annotations` list. The first annotation's
/// populated field decides how the message renders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub video_call_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub gsuite_integration_metadata: Option<GsuiteIntegrationMetadata>,
    #[serde(default)]
    pub url_metadata: Option<UrlMetadata>,
    #[serde(default)]
    pub drive_metadata: Option<DriveMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GsuiteIntegrationMetadata {
    #[serde(default)]
    pub call_data: Option<CallData>,
    #[serde(default)]
    pub tasks_data: Option<TasksData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallData {
    pub call_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TasksData {
    pub task_properties: TaskProperties,
    #[serde(default)]
    pub assignee_change: Option<AssigneeChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskProperties {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub assignee: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserId {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssigneeChange {
    pub old_assignee: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlMetadata {
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveMetadata {
    pub title: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_text_message() {
        let json = r#"{
            "messages": [{
                "creator": {"name": "Dana", "email": "dana@example.com"},
                "created_date": "Wednesday, January 3, 2024 at 2:30:45 PM UTC",
                "text": "שלום world",
                "topic_id": "ignored-by-the-model"
            }]
        }"#;
        let file: MessageFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.messages.len(), 1);
        let msg = &file.messages[0];
        assert_eq!(msg.creator.name, "Dana");
        assert_eq!(msg.text.as_deref(), Some("שלום world"));
        assert!(!msg.is_deleted());
        assert!(msg.attached_files.is_empty());
    }

    #[test]
    fn test_deleted_message_flag() {
        let json = r#"{
            "creator": {"name": "Dana"},
            "created_date": "x",
            "message_state": "DELETED"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.is_deleted());
        assert!(msg.creator.email.is_none());
    }

    #[test]
    fn test_deserialize_attachments() {
        let json = r#"{
            "creator": {"name": "Bob"},
            "created_date": "x",
            "attached_files": [{"export_name": "photo.jpg"}, {"export_name": "doc.pdf"}]
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.attached_files.len(), 2);
        assert_eq!(msg.attached_files[0].export_name, "photo.jpg");
    }

    #[test]
    fn test_deserialize_annotations() {
        let json = r#"{
            "creator": {"name": "Bob"},
            "created_date": "x",
            "annotations": [{
                "gsuite_integration_metadata": {
                    "tasks_data": {
                        "task_properties": {
                            "title": "Buy milk",
                            "completed": true,
                            "deleted": false,
                            "assignee": {"id": "users/123"}
                        }
                    }
                }
            }]
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let meta = msg.annotations[0]
            .gsuite_integration_metadata
            .as_ref()
            .unwrap();
        let tasks = meta.tasks_data.as_ref().unwrap();
        assert_eq!(tasks.task_properties.title, "Buy milk");
        assert!(tasks.task_properties.completed);
        assert_eq!(tasks.task_properties.assignee.as_ref().unwrap().id, "users/123");
    }

    #[test]
    fn test_deserialize_group_and_user_info() {
        let group: GroupInfo = serde_json::from_str(
            r#"{"members": [{"name": "Dana", "email": "dana@example.com"}, {"name": "Bob"}]}"#,
        )
        .unwrap();
        assert!(group.name.is_none());
        assert_eq!(group.members.len(), 2);

        let user: UserInfoFile = serde_json::from_str(
            r#"{"user": {"name": "Dana", "email": "dana@example.com"}, "membership_info": []}"#,
        )
        .unwrap();
        assert_eq!(user.user.email, "dana@example.com");
    }
}
