//! teachassist - command-line client for the teaching portal's generation
//! functions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::api::types::{
    AssistantTask, GenerationRequest, SyllabusMode, SyllabusRequest, TeachingAssistantRequest,
};
use crate::api::{AssistantClient, Generator};
use crate::config::Config;
use crate::docx;
use crate::errors::TeachAssistError;
use crate::notify::{ConsoleNotifier, ProgressPrinter};
use crate::quiz;
use crate::streaming::CancelToken;
use crate::telemetry::{init_tracing, init_tracing_verbose};

#[derive(Parser)]
#[command(name = "teachassist")]
#[command(about = "Stream AI-generated syllabi, lesson plans, quizzes and answers for your class")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print stream statistics after each generation
    #[arg(long, global = true)]
    show_stats: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a syllabus for a class and subject
    Syllabus {
        #[arg(long, value_enum, default_value = "full")]
        mode: SyllabusMode,
        /// Class or grade, e.g. "8"
        #[arg(long = "class", value_name = "CLASS")]
        class_level: String,
        #[arg(long)]
        subject: String,
        /// Examination board, e.g. CBSE
        #[arg(long)]
        board: Option<String>,
        /// Medium of instruction
        #[arg(long)]
        medium: Option<String>,
        /// Level of detail: brief, standard or detailed
        #[arg(long = "detail")]
        detail_level: Option<String>,
        /// Chapter number (chapter mode)
        #[arg(long)]
        chapter_number: Option<u32>,
        /// Chapter title (chapter mode)
        #[arg(long)]
        chapter_title: Option<String>,
        /// Number of chapters to outline
        #[arg(long = "chapters")]
        number_of_chapters: Option<u32>,
    },

    /// Generate a lesson plan from an uploaded document
    LessonPlan {
        #[arg(long = "document", value_name = "ID")]
        document_id: String,
        #[arg(long = "class", value_name = "CLASS")]
        class_level: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
        /// Lesson length in minutes
        #[arg(long)]
        duration: Option<u32>,
        /// Extra instructions for the plan
        #[arg(long)]
        notes: Option<String>,
    },

    /// Generate a quiz from an uploaded document
    Quiz {
        #[arg(long = "document", value_name = "ID")]
        document_id: String,
        #[arg(long = "class", value_name = "CLASS")]
        class_level: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
        /// mcq, short, long or mixed
        #[arg(long)]
        question_type: Option<String>,
        /// easy, medium or hard
        #[arg(long)]
        difficulty: Option<String>,
        /// Number of questions
        #[arg(long)]
        count: Option<u32>,
    },

    /// Ask a question about an uploaded document
    Ask {
        #[arg(long = "document", value_name = "ID")]
        document_id: String,
        question: String,
    },

    /// Get step-by-step homework help grounded in a document
    Homework {
        #[arg(long = "document", value_name = "ID")]
        document_id: String,
        question: String,
    },

    /// Split a saved quiz into questions (offline)
    ParseQuiz {
        file: String,
        /// Keep the teacher's answer key
        #[arg(long)]
        keep_answer_key: bool,
        /// Print questions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract plain text from a .docx file (offline)
    ExtractDocx { file: String },
}

pub async fn run(cancel: CancelToken) -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing_verbose();
    } else {
        init_tracing();
    }

    let no_color = cli.no_color || std::env::var("NO_COLOR").is_ok();
    if no_color {
        colored::control::set_override(false);
    }

    let request: GenerationRequest = match cli.command {
        Commands::ParseQuiz {
            file,
            keep_answer_key,
            json,
        } => return parse_quiz(&file, keep_answer_key, json),
        Commands::ExtractDocx { file } => return extract_docx(&file),

        Commands::Syllabus {
            mode,
            class_level,
            subject,
            board,
            medium,
            detail_level,
            chapter_number,
            chapter_title,
            number_of_chapters,
        } => {
            let mut req = SyllabusRequest::new(mode, class_level, subject);
            req.board = board;
            req.medium = medium;
            req.detail_level = detail_level;
            req.chapter_number = chapter_number;
            req.chapter_title = chapter_title;
            req.number_of_chapters = number_of_chapters;
            req.into()
        }
        Commands::LessonPlan {
            document_id,
            class_level,
            subject,
            chapter,
            duration,
            notes,
        } => TeachingAssistantRequest::lesson_plan(document_id)
            .with_class_level(class_level)
            .with_subject(subject)
            .with_chapter(chapter)
            .with_duration(duration)
            .with_notes(notes)
            .into(),
        Commands::Quiz {
            document_id,
            class_level,
            subject,
            chapter,
            question_type,
            difficulty,
            count,
        } => TeachingAssistantRequest::quiz(document_id)
            .with_class_level(class_level)
            .with_subject(subject)
            .with_chapter(chapter)
            .with_question_type(question_type)
            .with_difficulty(difficulty)
            .with_question_count(count)
            .into(),
        Commands::Ask {
            document_id,
            question,
        } => TeachingAssistantRequest::question(AssistantTask::Qa, document_id, question).into(),
        Commands::Homework {
            document_id,
            question,
        } => {
            TeachingAssistantRequest::question(AssistantTask::Homework, document_id, question)
                .into()
        }
    };

    let config = Config::load(cli.config.as_deref())
        .map_err(|e| TeachAssistError::Config(format!("{:#}", e)))?;
    let show_stats = cli.show_stats || config.ui.show_stats;
    let notifier = Arc::new(ConsoleNotifier::new(config.ui.color && !no_color));
    let client = AssistantClient::new(&config)?;
    let generator = Generator::new(client, notifier);

    let mut printer = ProgressPrinter::stdout();
    let result = generator
        .generate(&request, &cancel, |text: &str| printer.update(text))
        .await;
    let written = printer.finish();

    let completion = result?;
    written.context("Failed to write generated text")?;
    if show_stats {
        eprintln!("{}", completion.stats);
    }
    Ok(())
}

fn parse_quiz(file: &str, keep_answer_key: bool, json: bool) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read quiz {}", file))?;
    let content = if keep_answer_key {
        content
    } else {
        quiz::strip_answer_key(&content)
    };
    let questions = quiz::parse_questions(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    for q in &questions {
        let kind = serde_json::to_value(q.kind)?;
        println!("{} [{}] {}", q.id, kind.as_str().unwrap_or_default(), q.question);
        for option in &q.options {
            println!("    {}", option);
        }
    }
    Ok(())
}

fn extract_docx(file: &str) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file))?;
    let text = docx::extract_text(&bytes);
    if text.is_empty() {
        anyhow::bail!("No readable text found in {}", file);
    }
    if !docx::is_useful(&text) {
        tracing::warn!("only {} characters extracted from {}", text.len(), file);
    }
    println!("{}", text);
    Ok(())
}
