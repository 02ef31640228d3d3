//! DOCX processor: walks the document tree and rewrites paragraph text
//!
//! Top-level blocks, table rows, cells, and nested tables are visited in
//! document order. Each non-empty paragraph is collapsed to a single run
//! carrying the translated text, formatted like the original first run.

use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use docx_rs::{
    Bold, DocumentChild, Italic, Paragraph, ParagraphChild, Run, RunChild, Table, TableCell,
    TableCellContent, TableChild, TableRowChild, Underline,
};
use tracing::{debug, info};

use crate::core::client::Translate;
use crate::core::config::DEFAULT_MAX_TABLE_DEPTH;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::Direction;

/// A top-level body block the walk dispatches on
enum Block<'a> {
    /// Plain paragraph
    Paragraph(&'a mut Paragraph),
    /// Table, possibly holding nested tables in its cells
    Table(&'a mut Table),
}

/// Formatting captured from a paragraph's first run before any mutation
struct RunStyle {
    /// Tri-state bold flag
    bold: Option<Bold>,
    /// Tri-state italic flag
    italic: Option<Italic>,
    /// Underline style, if set
    underline: Option<Underline>,
}

/// Translates `.docx` documents while preserving their structure
#[derive(Debug)]
pub struct DocxProcessor<T> {
    translator: T,
    max_table_depth: usize,
}

impl<T: Translate + Sync> DocxProcessor<T> {
    /// Create a processor over the given translation client
    pub fn new(translator: T) -> Self {
        Self {
            translator,
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
        }
    }

    /// Override the nested-table recursion bound
    pub fn with_max_table_depth(mut self, depth: usize) -> Self {
        self.max_table_depth = depth;
        self
    }

    /// The translation client this processor runs on
    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Translate a whole document: parse the bytes, rewrite every block in
    /// document order, serialize the mutated tree back to bytes.
    pub async fn translate_document(&self, bytes: &[u8], direction: Direction) -> Result<Vec<u8>> {
        let mut docx =
            docx_rs::read_docx(bytes).map_err(|e| TranslationError::ParseError {
                message: e.to_string(),
            })?;

        let mut rewritten = 0;
        for block in block_items(&mut docx.document.children) {
            match block {
                Block::Paragraph(paragraph) => {
                    if self.rewrite_paragraph(paragraph, direction).await {
                        rewritten += 1;
                    }
                }
                Block::Table(table) => {
                    rewritten += self.walk_table(table, direction, 0).await?;
                }
            }
        }

        info!("Rewrote {} paragraphs ({})", rewritten, direction);

        let mut out = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut out)
            .map_err(|e| TranslationError::SerializeError {
                message: e.to_string(),
            })?;

        Ok(out.into_inner())
    }

    /// Translate one `.docx` file on disk
    pub async fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        direction: Direction,
    ) -> Result<()> {
        debug!("Translating: {}", input.display());

        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| TranslationError::FileError {
                path: input.display().to_string(),
                message: e.to_string(),
            })?;

        let translated = self.translate_document(&bytes, direction).await?;

        if let Some(parent) = output.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    TranslationError::FileError {
                        path: parent.display().to_string(),
                        message: e.to_string(),
                    }
                })?;
            }
        }

        tokio::fs::write(output, translated)
            .await
            .map_err(|e| TranslationError::FileError {
                path: output.display().to_string(),
                message: e.to_string(),
            })?;

        info!("Translated: {} -> {}", input.display(), output.display());
        Ok(())
    }

    /// Find `.docx` files directly inside a directory
    pub fn find_docx_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.is_docx_file(&path) {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Find `.docx` files recursively
    pub fn find_docx_files_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && self.is_docx_file(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Check if file is a Word document
    fn is_docx_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("docx"))
            .unwrap_or(false)
    }

    /// Replace a paragraph's runs with a single translated run.
    ///
    /// The style snapshot is taken from the first run before anything is
    /// removed. Whitespace-only paragraphs are left exactly as they are and
    /// never reach the translation service. Returns whether the paragraph
    /// was rewritten.
    async fn rewrite_paragraph(&self, paragraph: &mut Paragraph, direction: Direction) -> bool {
        let text = paragraph_text(paragraph);
        if text.trim().is_empty() {
            return false;
        }

        let style = first_run_style(paragraph);
        let translated = self.translator.translate(&text, direction).await;
        replace_runs(paragraph, translated, style);
        true
    }

    /// Visit every cell of every row, bounding nested-table depth.
    ///
    /// Returns the number of paragraphs rewritten under this table.
    fn walk_table<'a>(
        &'a self,
        table: &'a mut Table,
        direction: Direction,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>> {
        Box::pin(async move {
            if depth >= self.max_table_depth {
                return Err(TranslationError::StructureError {
                    message: format!("table nesting exceeds {} levels", self.max_table_depth),
                });
            }

            let mut rewritten = 0;
            for row_child in &mut table.rows {
                let TableChild::TableRow(row) = row_child;
                for cell_child in &mut row.cells {
                    let TableRowChild::TableCell(cell) = cell_child;
                    rewritten += self.walk_cell(cell, direction, depth).await?;
                }
            }

            Ok(rewritten)
        })
    }

    /// Rewrite the cell's paragraphs in order, then recurse into its nested
    /// tables in order.
    fn walk_cell<'a>(
        &'a self,
        cell: &'a mut TableCell,
        direction: Direction,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>> {
        Box::pin(async move {
            let mut rewritten = 0;

            for content in &mut cell.children {
                if let TableCellContent::Paragraph(paragraph) = content {
                    if self.rewrite_paragraph(paragraph, direction).await {
                        rewritten += 1;
                    }
                }
            }

            for content in &mut cell.children {
                if let TableCellContent::Table(table) = content {
                    rewritten += self.walk_table(table, direction, depth + 1).await?;
                }
            }

            Ok(rewritten)
        })
    }
}

/// Lazily yields the body's paragraph and table blocks in document order.
/// Other body elements (bookmarks, section markers) stay in the tree
/// untouched and survive serialization as-is.
fn block_items(children: &mut [DocumentChild]) -> impl Iterator<Item = Block<'_>> {
    children.iter_mut().filter_map(|child| match child {
        DocumentChild::Paragraph(paragraph) => Some(Block::Paragraph(&mut **paragraph)),
        DocumentChild::Table(table) => Some(Block::Table(&mut **table)),
        _ => None,
    })
}

/// Concatenated text of the paragraph's runs, in run order
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();

    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }

    text
}

/// Snapshot bold/italic/underline from the first run, if the paragraph has
/// any runs at all
fn first_run_style(paragraph: &Paragraph) -> Option<RunStyle> {
    paragraph.children.iter().find_map(|child| match child {
        ParagraphChild::Run(run) => Some(RunStyle {
            bold: run.run_property.bold.clone(),
            italic: run.run_property.italic.clone(),
            underline: run.run_property.underline.clone(),
        }),
        _ => None,
    })
}

/// Drop every run and append a single run carrying `text`, with the style
/// snapshot applied. Non-run children are kept in place.
fn replace_runs(paragraph: &mut Paragraph, text: String, style: Option<RunStyle>) {
    paragraph
        .children
        .retain(|child| !matches!(child, ParagraphChild::Run(_)));

    let mut run = Run::new().add_text(text.as_str());
    if let Some(style) = style {
        run.run_property.bold = style.bold;
        run.run_property.italic = style.italic;
        run.run_property.underline = style.underline;
    }

    paragraph.children.push(ParagraphChild::Run(Box::new(run)));
}
