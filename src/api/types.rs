use crate::errors::{ApiError, StatusMapping};
use serde::{Deserialize, Serialize};

/// Function serving lesson plans, quizzes, Q&A and homework help.
pub const TEACHING_ASSISTANT_FUNCTION: &str = "teaching-assistant";
/// Function serving syllabus generation.
pub const SYLLABUS_FUNCTION: &str = "generate-syllabus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AssistantTask {
    LessonPlan,
    Quiz,
    Qa,
    Homework,
}

impl std::fmt::Display for AssistantTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantTask::LessonPlan => write!(f, "lesson plan"),
            AssistantTask::Quiz => write!(f, "quiz"),
            AssistantTask::Qa => write!(f, "Q&A"),
            AssistantTask::Homework => write!(f, "homework help"),
        }
    }
}

/// Body of a `teaching-assistant` call. The function looks up the
/// document's extracted text itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingAssistantRequest {
    #[serde(rename = "type")]
    pub task: AssistantTask,
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_questions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_name: Option<String>,
    /// Lesson length in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    pub stream: bool,
}

impl TeachingAssistantRequest {
    fn base(task: AssistantTask, document_id: impl Into<String>) -> Self {
        Self {
            task,
            document_id: document_id.into(),
            user_message: None,
            question_type: None,
            difficulty: None,
            number_of_questions: None,
            class_level: None,
            subject: None,
            chapter_name: None,
            duration: None,
            additional_notes: None,
            stream: true,
        }
    }

    pub fn lesson_plan(document_id: impl Into<String>) -> Self {
        Self::base(AssistantTask::LessonPlan, document_id)
    }

    pub fn quiz(document_id: impl Into<String>) -> Self {
        Self::base(AssistantTask::Quiz, document_id)
    }

    /// A student question answered from the document (`Qa` or `Homework`).
    pub fn question(
        task: AssistantTask,
        document_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut req = Self::base(task, document_id);
        req.user_message = Some(message.into());
        req
    }

    pub fn with_class_level(mut self, class_level: Option<String>) -> Self {
        self.class_level = class_level;
        self
    }

    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    pub fn with_chapter(mut self, chapter_name: Option<String>) -> Self {
        self.chapter_name = chapter_name;
        self
    }

    pub fn with_duration(mut self, minutes: Option<u32>) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.additional_notes = notes;
        self
    }

    pub fn with_question_type(mut self, question_type: Option<String>) -> Self {
        self.question_type = question_type;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<String>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_question_count(mut self, count: Option<u32>) -> Self {
        self.number_of_questions = count;
        self
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.document_id.trim().is_empty() {
            return Err(ApiError::Validation("Document ID is required".to_string()));
        }
        if matches!(self.task, AssistantTask::Qa | AssistantTask::Homework)
            && self
                .user_message
                .as_deref()
                .map_or(true, |m| m.trim().is_empty())
        {
            return Err(ApiError::Validation("A question is required".to_string()));
        }
        if self.number_of_questions == Some(0) {
            return Err(ApiError::Validation(
                "Number of questions must be at least 1".to_string(),
            ));
        }
        if self.duration == Some(0) {
            return Err(ApiError::Validation(
                "Duration must be at least 1 minute".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SyllabusMode {
    /// Complete syllabus, chapter by chapter
    Full,
    /// Detailed content for a single chapter
    Chapter,
    /// Chapter titles and outlines in bulk
    Bulk,
}

/// Body of a `generate-syllabus` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusRequest {
    pub mode: SyllabusMode,
    pub class_level: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_chapters: Option<u32>,
    pub stream: bool,
}

impl SyllabusRequest {
    pub fn new(
        mode: SyllabusMode,
        class_level: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            class_level: class_level.into(),
            subject: subject.into(),
            board: None,
            medium: None,
            detail_level: None,
            chapter_number: None,
            chapter_title: None,
            number_of_chapters: None,
            stream: true,
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.class_level.trim().is_empty() || self.subject.trim().is_empty() {
            return Err(ApiError::Validation(
                "Missing required fields: mode, classLevel, subject".to_string(),
            ));
        }
        if self.mode == SyllabusMode::Chapter
            && self.chapter_number.is_none()
            && self
                .chapter_title
                .as_deref()
                .map_or(true, |t| t.trim().is_empty())
        {
            return Err(ApiError::Validation(
                "Chapter mode requires chapterNumber or chapterTitle".to_string(),
            ));
        }
        if self.number_of_chapters == Some(0) {
            return Err(ApiError::Validation(
                "Number of chapters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Any streamed generation the portal can ask for.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Assistant(TeachingAssistantRequest),
    Syllabus(SyllabusRequest),
}

impl GenerationRequest {
    /// Function name the request is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            GenerationRequest::Assistant(_) => TEACHING_ASSISTANT_FUNCTION,
            GenerationRequest::Syllabus(_) => SYLLABUS_FUNCTION,
        }
    }

    /// How failure statuses of this request's function are reported.
    pub fn status_mapping(&self) -> StatusMapping {
        match self {
            GenerationRequest::Assistant(_) => StatusMapping::Assistant,
            GenerationRequest::Syllabus(_) => StatusMapping::Syllabus,
        }
    }

    /// Short human label for logs.
    pub fn label(&self) -> String {
        match self {
            GenerationRequest::Assistant(req) => req.task.to_string(),
            GenerationRequest::Syllabus(req) => {
                format!("{:?} syllabus", req.mode).to_lowercase()
            }
        }
    }

    /// Reject requests the function would answer with 400.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            GenerationRequest::Assistant(req) => req.validate(),
            GenerationRequest::Syllabus(req) => req.validate(),
        }
    }

    pub fn body(&self) -> serde_json::Value {
        match self {
            GenerationRequest::Assistant(req) => serde_json::json!(req),
            GenerationRequest::Syllabus(req) => serde_json::json!(req),
        }
    }
}

impl From<TeachingAssistantRequest> for GenerationRequest {
    fn from(req: TeachingAssistantRequest) -> Self {
        GenerationRequest::Assistant(req)
    }
}

impl From<SyllabusRequest> for GenerationRequest {
    fn from(req: SyllabusRequest) -> Self {
        GenerationRequest::Syllabus(req)
    }
}

/// JSON body of a failed function call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Lenient parse: anything that isn't `{"error": "..."}` yields `None`.
    pub fn message_from(text: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(text)
            .ok()
            .and_then(|b| b.error)
    }
}
