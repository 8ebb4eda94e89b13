use chrono::{DateTime, Utc};
use genpdf::elements::{Break, LinearLayout, Paragraph};
use genpdf::style::Style;
use genpdf::{Alignment, Element, Margins, SimplePageDecorator};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("font loading failed: {0}")]
    Font(String),

    #[error("pdf rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Renders markdown to the legal-document PDF layout. Walks markdown events
/// directly into `genpdf` elements rather than through an HTML
/// intermediary (the original renders via WeasyPrint's HTML+CSS pipeline —
/// `examples/original_source/app/services/pdf_service.py` — but nothing in
/// the example pack bridges HTML to PDF, so the same visual contract —
/// A4, justified body text, page header/footer, a bold reference-number
/// line — is reproduced by laying markdown blocks out directly).
pub struct PdfRenderer {
    font_family: genpdf::fonts::FontFamily<genpdf::fonts::FontData>,
}

impl PdfRenderer {
    pub fn load(font_dir: &str) -> Result<Self> {
        let font_family = genpdf::fonts::from_files(font_dir, "LiberationSans", None)
            .map_err(|e| PdfError::Font(e.to_string()))?;
        Ok(Self { font_family })
    }

    pub fn render(&self, markdown: &str, reference_number: &str, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
        let mut doc = genpdf::Document::new(self.font_family.clone());
        doc.set_title("Sumii - Rechtliche Zusammenfassung");
        doc.set_paper_size(genpdf::PaperSize::A4);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::trbl(25, 20, 20, 20));
        decorator.set_header(|_page| {
            let mut layout = LinearLayout::vertical();
            layout.push(
                Paragraph::new("Sumii - Rechtliche Zusammenfassung")
                    .aligned(Alignment::Center)
                    .styled(Style::new().with_font_size(10)),
            );
            layout.push(Break::new(1));
            layout
        });
        decorator.set_footer(|page| {
            Paragraph::new(format!("Seite {page}")).aligned(Alignment::Center).styled(Style::new().with_font_size(10))
        });
        doc.set_page_decorator(decorator);

        doc.push(
            Paragraph::new(format!("Referenznummer: {reference_number}"))
                .styled(Style::new().bold().with_font_size(12)),
        );
        doc.push(
            Paragraph::new(format!("Erstellt am {}", generated_at.format("%d.%m.%Y")))
                .styled(Style::new().with_font_size(9)),
        );
        doc.push(Break::new(1));

        for element in markdown_to_elements(markdown) {
            doc.push(element);
        }

        let mut bytes = Vec::new();
        doc.render(&mut bytes).map_err(|e| PdfError::Render(e.to_string()))?;
        Ok(bytes)
    }
}

fn markdown_to_elements(markdown: &str) -> Vec<Box<dyn Element>> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut elements: Vec<Box<dyn Element>> = Vec::new();
    let mut current = String::new();
    let mut heading_level: Option<HeadingLevel> = None;
    let mut in_list_item = false;

    let flush_paragraph = |elements: &mut Vec<Box<dyn Element>>, text: &mut String, heading: Option<HeadingLevel>| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            text.clear();
            return;
        }
        let paragraph = match heading {
            Some(HeadingLevel::H1) => Paragraph::new(trimmed).styled(Style::new().bold().with_font_size(20)),
            Some(HeadingLevel::H2) => Paragraph::new(trimmed).styled(Style::new().bold().with_font_size(16)),
            Some(_) => Paragraph::new(trimmed).styled(Style::new().bold().with_font_size(13)),
            None => Paragraph::new(trimmed).aligned(Alignment::Justified),
        };
        elements.push(Box::new(paragraph));
        elements.push(Box::new(Break::new(1)));
        text.clear();
    };

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush_paragraph(&mut elements, &mut current, None);
                heading_level = Some(level);
            }
            Event::End(TagEnd::Heading(_)) => {
                flush_paragraph(&mut elements, &mut current, heading_level.take());
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                flush_paragraph(&mut elements, &mut current, None);
            }
            Event::Start(Tag::Item) => {
                in_list_item = true;
                current.push_str("\u{2022} ");
            }
            Event::End(TagEnd::Item) => {
                in_list_item = false;
                flush_paragraph(&mut elements, &mut current, None);
            }
            Event::Text(text) | Event::Code(text) => {
                current.push_str(&text);
            }
            Event::SoftBreak | Event::HardBreak => {
                current.push(' ');
            }
            Event::Rule => {
                flush_paragraph(&mut elements, &mut current, None);
                elements.push(Box::new(Break::new(1)));
            }
            _ => {}
        }
    }
    if !in_list_item {
        flush_paragraph(&mut elements, &mut current, None);
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_to_elements_produces_at_least_one_block_per_heading_and_paragraph() {
        let elements = markdown_to_elements("# Titel\n\nEin Absatz.\n\n- Punkt eins\n- Punkt zwei");
        assert!(elements.len() >= 3);
    }
}
