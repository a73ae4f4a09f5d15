//! Resource kinds and their API metadata.

/// Static metadata for one kind of AtTask object.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Display name of the kind.
    pub name: &'static str,
    /// Endpoint path segment under the API URL.
    pub endpoint: &'static str,
    /// Value of `objCode` in server payloads.
    pub obj_code: &'static str,
    /// Recognized fields, in server spelling.
    pub fields: &'static [&'static str],
}

impl ResourceDescriptor {
    /// Whether a server field name is recognized (case-sensitive).
    pub fn recognizes(&self, server_field: &str) -> bool {
        self.fields.contains(&server_field)
    }

    /// Whether a client-side (lower-cased) key maps to a recognized field.
    pub fn accepts(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.to_lowercase() == key)
    }

    /// Comma-joined field list for the `fields` request parameter.
    pub fn field_list(&self) -> String {
        self.fields.join(",")
    }
}

pub static TASK: ResourceDescriptor = ResourceDescriptor {
    name: "Task",
    endpoint: "task",
    obj_code: "TASK",
    fields: &[
        "ID",
        "name",
        "objCode",
        "percentComplete",
        "plannedCompletionDate",
        "plannedStartDate",
        "priority",
        "progressStatus",
        "projectedCompletionDate",
        "projectedStartDate",
        "status",
        "taskNumber",
        "wbs",
        "workRequired",
    ],
};

pub static PROJECT: ResourceDescriptor = ResourceDescriptor {
    name: "Project",
    endpoint: "project",
    obj_code: "PROJ",
    fields: &[
        "ID",
        "name",
        "objCode",
        "ownerID",
        "priority",
        "status",
        "groupID",
        "description",
        "condition",
        "percentComplete",
        "projectedCompletionDate",
    ],
};

pub static USER: ResourceDescriptor = ResourceDescriptor {
    name: "User",
    endpoint: "user",
    obj_code: "USER",
    fields: &["ID", "name", "objCode", "homeGroupID", "homeTeamID", "username"],
};

pub static ISSUE: ResourceDescriptor = ResourceDescriptor {
    name: "Issue",
    endpoint: "issue",
    obj_code: "ISSUE",
    fields: &[
        "ID",
        "name",
        "objCode",
        "isComplete",
        "assignedToID",
        "ownerID",
        "description",
        "priority",
        "projectID",
        "teamID",
        "status",
        "statusUpdate",
        "submittedByID",
        "workRequired",
        "severity",
    ],
};

/// Every declared kind.
pub static ALL: [&ResourceDescriptor; 4] = [&TASK, &PROJECT, &USER, &ISSUE];

/// Look up a kind by its `objCode`.
pub fn by_obj_code(obj_code: &str) -> Option<&'static ResourceDescriptor> {
    ALL.into_iter().find(|d| d.obj_code == obj_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_is_case_sensitive() {
        assert!(TASK.recognizes("percentComplete"));
        assert!(!TASK.recognizes("percentcomplete"));
        assert!(!TASK.recognizes("id"));
    }

    #[test]
    fn test_accepts_lowercase_keys() {
        assert!(TASK.accepts("id"));
        assert!(TASK.accepts("percentcomplete"));
        assert!(!TASK.accepts("percentComplete"));
        assert!(!TASK.accepts("ownerid"));
        assert!(PROJECT.accepts("ownerid"));
    }

    #[test]
    fn test_field_list() {
        assert_eq!(USER.field_list(), "ID,name,objCode,homeGroupID,homeTeamID,username");
    }

    #[test]
    fn test_every_kind_has_identity_fields() {
        for descriptor in ALL {
            for field in ["ID", "name", "objCode"] {
                assert!(descriptor.recognizes(field), "{} lacks {}", descriptor.name, field);
            }
        }
    }

    #[test]
    fn test_by_obj_code() {
        assert_eq!(by_obj_code("PROJ"), Some(&PROJECT));
        assert_eq!(by_obj_code("proj"), None);
    }
}
