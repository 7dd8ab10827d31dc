use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::feed::labels;
use crate::labeling::Joy;

/// Stored timestamp shape; sorts lexicographically in time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn now_timestamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub username: String,
    pub registration_date: String,
}

/// A user about to be registered.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub registration_date: String,
}

impl NewUser {
    pub fn new(email: &str, username: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            email: required(email, "email")?,
            username: required(username, "username")?,
            registration_date: now_timestamp(),
        })
    }
}

/// A post about to be written. Labels are kept in their stored form.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub image_name: String,
    pub author_email: String,
    pub author_name: String,
    pub image_url: String,
    pub description: String,
    pub labels: String,
    pub date_added: String,
}

impl NewPost {
    pub fn new(
        image_name: &str,
        author_email: &str,
        author_name: &str,
        image_url: &str,
        description: &str,
        label_list: &[String],
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            image_name: required(image_name, "image name")?,
            author_email: required(author_email, "author email")?,
            author_name: required(author_name, "author name")?,
            image_url: required(image_url, "image url")?,
            description: description.to_string(),
            labels: labels::encode(label_list),
            date_added: now_timestamp(),
        })
    }
}

/// A face photo and how joyful its first face looks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub blob_name: String,
    pub image_public_url: String,
    pub timestamp: String,
    /// Display form of the likelihood, e.g. "Very Likely"
    pub joy: String,
}

impl Face {
    pub fn new(
        blob_name: &str,
        image_public_url: &str,
        joy: Joy,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            blob_name: required(blob_name, "blob name")?,
            image_public_url: required(image_public_url, "image url")?,
            timestamp: now_timestamp(),
            joy: joy.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_trims_fields() {
        let user = NewUser::new("  a@x.com ", " alice ").unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.username, "alice");
        assert!(!user.registration_date.is_empty());
    }

    #[test]
    fn new_user_requires_email_and_username() {
        assert_eq!(
            NewUser::new("", "alice").unwrap_err(),
            ValidationError::Required("email")
        );
        assert_eq!(
            NewUser::new("a@x.com", "   ").unwrap_err(),
            ValidationError::Required("username")
        );
    }

    #[test]
    fn new_post_encodes_labels_and_keeps_description() {
        let post = NewPost::new(
            "abc.jpg",
            "a@x.com",
            "alice",
            "/media/abc.jpg",
            "  sunset  ",
            &["Sky".to_string(), "Cloud".to_string()],
        )
        .unwrap();
        assert_eq!(post.labels, r#"[{"0":"Sky"},{"1":"Cloud"}]"#);
        assert_eq!(post.description, "  sunset  ");
    }

    #[test]
    fn new_post_allows_empty_description() {
        let post = NewPost::new("abc.jpg", "a@x.com", "alice", "/media/abc.jpg", "", &[]);
        assert!(post.is_ok());
    }

    #[test]
    fn new_post_requires_author() {
        let err = NewPost::new("abc.jpg", "", "alice", "/media/abc.jpg", "hi", &[]).unwrap_err();
        assert_eq!(err, ValidationError::Required("author email"));
    }

    #[test]
    fn face_stores_joy_as_display_text() {
        let face = Face::new("f.jpg", "/media/f.jpg", Joy::VeryLikely).unwrap();
        assert_eq!(face.joy, "Very Likely");
        assert!(!face.timestamp.is_empty());
        assert_eq!(
            Face::new("", "/media/f.jpg", Joy::Unknown).unwrap_err(),
            ValidationError::Required("blob name")
        );
    }

    #[test]
    fn timestamps_sort_in_time_order() {
        let earlier = chrono::NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 0, 0, 5)
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let later = chrono::NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_micro_opt(10, 0, 0, 0)
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        assert_eq!(earlier, "2020-05-01 09:00:00.000005");
        assert!(earlier < later);
    }
}
