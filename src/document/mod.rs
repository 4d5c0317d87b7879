//! Document assembly - turns proposal content into a paginated PDF.
//!
//! Two layouts are available:
//! - [`ProposalAssembler`] - title block, cover letter, pricing table and
//!   contract, each major section on its own page.
//! - [`PlainTextAssembler`] - a title line followed by a composed body,
//!   one source line per layout line.

pub mod common;
pub mod layout;
pub mod table;
pub mod text;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::pricing::{self, PricingResult};
use layout::{
    truncate_to_width, Font, PageCanvas, BODY, CONTENT_BOTTOM, CONTENT_WIDTH, HEADING, MARGIN, TITLE,
};

pub use common::{secure_filename, suggested_filename};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Encoding or serialization failure. No partial output is ever returned.
#[derive(Debug, Error)]
pub enum DocumentBuildError {
    #[error("failed to encode page content: {0}")]
    Encode(#[source] BoxError),
    #[error("failed to write PDF: {0}")]
    Write(#[source] BoxError),
}

/// Everything the sectioned layout needs, built once per request.
#[derive(Debug, Clone)]
pub struct ProposalDocument {
    pub client_name: String,
    pub project_type: String,
    pub company_name: String,
    pub generation_date: NaiveDate,
    pub pricing: PricingResult,
    pub cover_letter: String,
    pub contract_text: String,
}

impl ProposalDocument {
    /// Price the project and render both texts for `date`.
    pub fn prepare(
        client_name: &str,
        project_type: &str,
        company_name: &str,
        date: NaiveDate,
    ) -> Self {
        Self {
            client_name: client_name.to_string(),
            project_type: project_type.to_string(),
            company_name: company_name.to_string(),
            generation_date: date,
            pricing: pricing::price(project_type),
            cover_letter: text::cover_letter_on(date, client_name, project_type, company_name),
            contract_text: text::contract_text_on(date, client_name, project_type, company_name),
        }
    }

    pub fn title(&self) -> String {
        format!("{} — Proposal", self.company_name)
    }
}

/// A composed proposal body laid out as plain text.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub client_name: String,
    pub project_title: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug)]
pub struct RenderedFile {
    pub id: Uuid,
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
}

/// Trait for document assemblers.
pub trait Assembler<Doc> {
    fn assemble(&self, document: &Doc) -> Result<RenderedFile, DocumentBuildError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProposalAssembler;

impl ProposalAssembler {
    fn layout(&self, document: &ProposalDocument) -> Result<Vec<u8>, DocumentBuildError> {
        let mut canvas = PageCanvas::new();

        canvas.paragraph(&document.title(), TITLE);
        canvas.labelled_line("Client: ", &document.client_name);
        canvas.labelled_line("Project: ", &document.project_type);
        canvas.paragraph(
            &format!("Date: {}", text::format_long_date(document.generation_date)),
            BODY,
        );
        canvas.spacer(12.0);

        canvas.paragraph("Cover Letter", HEADING);
        for para in text::paragraphs(&document.cover_letter) {
            canvas.paragraph(para, BODY);
            canvas.spacer(6.0);
        }
        canvas.page_break();

        canvas.paragraph("Pricing & Scope", HEADING);
        canvas.spacer(6.0);
        table::draw_pricing_table(&mut canvas, &document.pricing);
        canvas.spacer(12.0);
        canvas.page_break();

        canvas.paragraph("Contract & Terms", HEADING);
        for para in text::paragraphs(&document.contract_text) {
            canvas.paragraph(para, BODY);
            canvas.spacer(6.0);
        }

        canvas.finish(&document.title())
    }
}

impl Assembler<ProposalDocument> for ProposalAssembler {
    fn assemble(&self, document: &ProposalDocument) -> Result<RenderedFile, DocumentBuildError> {
        let bytes = self.layout(document)?;
        let id = Uuid::new_v4();
        let suggested_filename =
            suggested_filename(&document.client_name, &document.project_type, &id);
        log::debug!(
            "Assembled proposal {} ({} bytes)",
            suggested_filename,
            bytes.len()
        );
        Ok(RenderedFile {
            id,
            bytes,
            suggested_filename,
        })
    }
}

/// Lay out a proposal with the sectioned layout.
pub fn assemble(document: &ProposalDocument) -> Result<RenderedFile, DocumentBuildError> {
    ProposalAssembler.assemble(document)
}

pub const PLAIN_CHARS_PER_LINE: usize = 95;
pub const PLAIN_LINE_HEIGHT: f32 = 14.0;
const PLAIN_TITLE_SIZE: f32 = 16.0;
const PLAIN_TITLE_GAP: f32 = 24.0;

/// Body lines as they will be drawn: one per source line, cut at
/// [`PLAIN_CHARS_PER_LINE`] characters. Overlong lines are truncated, not
/// wrapped.
pub fn plain_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(|line| line.chars().take(PLAIN_CHARS_PER_LINE).collect())
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextAssembler;

impl PlainTextAssembler {
    fn layout(&self, document: &ComposedDocument) -> Result<Vec<u8>, DocumentBuildError> {
        let mut canvas = PageCanvas::new();

        let title: String = document.title.chars().take(PLAIN_CHARS_PER_LINE).collect();
        let title = truncate_to_width(&title, Font::Bold, PLAIN_TITLE_SIZE, CONTENT_WIDTH);
        canvas.advance(PLAIN_TITLE_SIZE);
        let y = canvas.cursor_y();
        canvas.text_at(MARGIN, y, &title, Font::Bold, PLAIN_TITLE_SIZE);
        canvas.advance(PLAIN_TITLE_GAP);

        for line in plain_lines(&document.body) {
            if canvas.cursor_y() - PLAIN_LINE_HEIGHT < CONTENT_BOTTOM {
                canvas.page_break();
            }
            canvas.advance(PLAIN_LINE_HEIGHT);
            let y = canvas.cursor_y();
            canvas.text_at(MARGIN, y, &line, Font::Regular, BODY.size);
        }

        canvas.finish(&document.title)
    }
}

impl Assembler<ComposedDocument> for PlainTextAssembler {
    fn assemble(&self, document: &ComposedDocument) -> Result<RenderedFile, DocumentBuildError> {
        let bytes = self.layout(document)?;
        let id = Uuid::new_v4();
        let suggested_filename =
            suggested_filename(&document.client_name, &document.project_title, &id);
        Ok(RenderedFile {
            id,
            bytes,
            suggested_filename,
        })
    }
}
