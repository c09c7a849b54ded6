use crate::attachment::{self, AttachedImage, AttachmentError};
use crate::scheduled_post::{parse_date, parse_time, Platform, PostDraft};
use chrono::{Local, NaiveDate};
use std::path::Path;

pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MAX_CHARS: usize = 1000;

/// Why a submission was refused. Only the first failing rule is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a post title")]
    TitleRequired,
    #[error("Please enter post content")]
    ContentRequired,
    #[error("Please select at least one platform")]
    PlatformRequired,
    #[error("Please set date and time")]
    ScheduleRequired,
    #[error("Use YYYY-MM-DD and HH:MM")]
    InvalidSchedule,
    #[error("Please pick today or a later date")]
    DateInPast,
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::TitleRequired => "Title required",
            ValidationError::ContentRequired => "Content required",
            ValidationError::PlatformRequired => "Platform required",
            ValidationError::ScheduleRequired => "Schedule required",
            ValidationError::InvalidSchedule => "Invalid schedule",
            ValidationError::DateInPast => "Invalid date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Content,
    ImagePath,
    Date,
    Time,
}

#[derive(Debug, Default, Clone)]
pub struct PostForm {
    title: String,
    content: String,
    image_path: String,
    image: Option<AttachedImage>,
    platforms: Vec<Platform>,
    scheduled_date: String,
    scheduled_time: String,
}

impl PostForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Content => &self.content,
            TextField::ImagePath => &self.image_path,
            TextField::Date => &self.scheduled_date,
            TextField::Time => &self.scheduled_time,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Title => &mut self.title,
            TextField::Content => &mut self.content,
            TextField::ImagePath => &mut self.image_path,
            TextField::Date => &mut self.scheduled_date,
            TextField::Time => &mut self.scheduled_time,
        }
    }

    /// Append a character, ignoring it once the field is full.
    pub fn push_char(&mut self, field: TextField, c: char) {
        let limit = match field {
            TextField::Title => Some(TITLE_MAX_CHARS),
            TextField::Content => Some(CONTENT_MAX_CHARS),
            _ => None,
        };
        let text = self.text_mut(field);
        if limit.is_some_and(|max| text.chars().count() >= max) {
            return;
        }
        text.push(c);
    }

    pub fn pop_char(&mut self, field: TextField) {
        self.text_mut(field).pop();
    }

    pub fn set_text(&mut self, field: TextField, value: &str) {
        self.text_mut(field).clear();
        for c in value.chars() {
            self.push_char(field, c);
        }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn is_selected(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    pub fn toggle_platform(&mut self, platform: Platform) {
        if let Some(index) = self.platforms.iter().position(|p| *p == platform) {
            self.platforms.remove(index);
        } else {
            self.platforms.push(platform);
        }
    }

    pub fn image(&self) -> Option<&AttachedImage> {
        self.image.as_ref()
    }

    /// Attach the file at `path`. On failure the current image is kept.
    pub fn attach_image(&mut self, path: &Path) -> Result<(), AttachmentError> {
        let image = attachment::read_image(path)?;
        self.image = Some(image);
        self.image_path.clear();
        Ok(())
    }

    /// Attach whatever path has been typed into the image field.
    pub fn attach_typed_image(&mut self) -> Result<(), AttachmentError> {
        let path = self.image_path.trim().to_string();
        self.attach_image(Path::new(&path))
    }

    pub fn remove_image(&mut self) {
        self.image = None;
        self.image_path.clear();
    }

    pub fn validate(&self) -> Result<PostDraft, ValidationError> {
        self.validate_on(Local::now().date_naive())
    }

    /// Validate as if the local date were `today`.
    pub fn validate_on(&self, today: NaiveDate) -> Result<PostDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::ContentRequired);
        }
        if self.platforms.is_empty() {
            return Err(ValidationError::PlatformRequired);
        }
        let date = self.scheduled_date.trim();
        let time = self.scheduled_time.trim();
        if date.is_empty() || time.is_empty() {
            return Err(ValidationError::ScheduleRequired);
        }
        let (Some(day), Some(_)) = (parse_date(date), parse_time(time)) else {
            return Err(ValidationError::InvalidSchedule);
        };
        if day < today {
            return Err(ValidationError::DateInPast);
        }

        Ok(PostDraft {
            title: title.to_string(),
            content: content.to_string(),
            image: self.image.as_ref().map(|i| i.data_uri.clone()),
            platforms: self.platforms.clone(),
            scheduled_date: date.to_string(),
            scheduled_time: time.to_string(),
        })
    }

    pub fn reset(&mut self) {
        *self = PostForm::default();
    }
}
