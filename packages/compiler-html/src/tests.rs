use crate::{compile_document, heading_anchors, CompileOptions, TOC_EMPTY};
use blockpost_editor::{BlockType, CalloutColor, CodeLanguage, Document, Mutation};

fn compile(doc: &Document) -> String {
    compile_document(doc, CompileOptions::default())
}

fn doc_with(blocks: &[(BlockType, &str)]) -> Document {
    let mut doc = Document::new("drafts/compile");
    for (i, (block_type, content)) in blocks.iter().enumerate() {
        doc.insert_block(i, *block_type, content);
    }
    doc.remove_block(0);
    doc
}

#[test]
fn test_compile_paragraph_verbatim() {
    let doc = doc_with(&[(BlockType::Paragraph, "Hello <b>world</b>")]);
    assert_eq!(compile(&doc), "<p>Hello <b>world</b></p>");
}

#[test]
fn test_compile_headings_with_anchor_ids() {
    let doc = doc_with(&[
        (BlockType::Heading1, "Intro"),
        (BlockType::Heading2, "Intro"),
        (BlockType::Heading3, "Getting <i>Started</i>"),
    ]);

    assert_eq!(
        compile(&doc),
        "<h1 id=\"intro\">Intro</h1><h2 id=\"intro-1\">Intro</h2><h3 id=\"getting-started\">Getting <i>Started</i></h3>"
    );
}

#[test]
fn test_compile_code_block() {
    let mut doc = doc_with(&[(BlockType::Code, "fn main() {}")]);
    let id = doc.blocks()[0].id().clone();
    doc.apply(Mutation::SetCodeLanguage {
        id,
        language: CodeLanguage::Rust,
    });

    assert_eq!(
        compile(&doc),
        "<pre><code class=\"language-rust\">fn main() {}</code></pre>"
    );
}

#[test]
fn test_compile_table_header_row() {
    let mut doc = doc_with(&[(BlockType::Table, "")]);
    let id = doc.blocks()[0].id().clone();
    doc.apply(Mutation::SetCell {
        id: id.clone(),
        row: 0,
        col: 0,
        value: "A & B".to_string(),
    });

    let html = compile(&doc);
    assert_eq!(html.matches("<th ").count(), 3);
    assert_eq!(html.matches("<td ").count(), 6);
    assert!(html.contains(">A &amp; B</th>"));

    doc.apply(Mutation::ToggleHeader { id });
    let html = compile(&doc);
    assert_eq!(html.matches("<th ").count(), 0);
    assert_eq!(html.matches("<td ").count(), 9);
}

#[test]
fn test_compile_image_caption() {
    let mut doc = doc_with(&[(BlockType::Image, "https://x.test/a.png")]);
    assert_eq!(
        compile(&doc),
        "<figure><img src=\"https://x.test/a.png\" alt=\"\" /></figure>"
    );

    let id = doc.blocks()[0].id().clone();
    doc.apply(Mutation::SetCaption {
        id,
        caption: "A \"cat\"".to_string(),
    });
    assert_eq!(
        compile(&doc),
        "<figure><img src=\"https://x.test/a.png\" alt=\"A &quot;cat&quot;\" /><figcaption>A \"cat\"</figcaption></figure>"
    );
}

#[test]
fn test_compile_lists_verbatim() {
    let doc = doc_with(&[
        (BlockType::BulletedList, "<ul><li>a</li></ul>"),
        (BlockType::NumberedList, "one\ntwo"),
    ]);
    assert_eq!(
        compile(&doc),
        "<ul><li>a</li></ul><ol><li>one</li><li>two</li></ol>"
    );
}

#[test]
fn test_compile_callout_colors() {
    let mut doc = doc_with(&[(BlockType::Callout, "Careful <now>")]);
    let id = doc.blocks()[0].id().clone();
    doc.apply(Mutation::SetCallout {
        id,
        icon: None,
        color: Some(CalloutColor::Red),
    });

    let html = compile(&doc);
    assert!(html.starts_with("<div data-block-type=\"callout\" data-color=\"red\""));
    assert!(html.contains("border-left: 4px solid #ef4444"));
    assert!(html.contains("background-color: #fef2f2"));
    assert!(html.contains("<span>💡</span><div>Careful &lt;now&gt;</div>"));
}

#[test]
fn test_compile_quote_and_separator() {
    let doc = doc_with(&[(BlockType::Quote, "a < b"), (BlockType::Separator, "")]);
    assert_eq!(compile(&doc), "<blockquote>a &lt; b</blockquote><hr />");
}

#[test]
fn test_compile_toc_from_current_headings() {
    let mut doc = doc_with(&[
        (BlockType::TableOfContents, ""),
        (BlockType::Heading1, "Intro"),
        (BlockType::Heading2, "Details"),
    ]);

    let html = compile(&doc);
    assert!(html.starts_with("<div data-block-type=\"toc\" style=\"background-color: #f9fafb;"));
    assert!(html.contains("<a href=\"#intro\" style=\"display: block; padding-left: 0px;\">Intro</a>"));
    assert!(html.contains("<a href=\"#details\" style=\"display: block; padding-left: 16px;\">Details</a>"));

    // Edits are reflected at the next serialization
    let heading = doc.blocks()[1].id().clone();
    doc.update_block_content(&heading, "Overview");
    assert!(compile(&doc).contains("href=\"#overview\""));
}

#[test]
fn test_compile_empty_toc_placeholder() {
    let doc = doc_with(&[(BlockType::TableOfContents, "")]);
    assert!(compile(&doc).contains(TOC_EMPTY));
}

#[test]
fn test_pretty_output_puts_blocks_on_lines() {
    let doc = doc_with(&[(BlockType::Paragraph, "a"), (BlockType::Separator, "")]);
    let html = compile_document(
        &doc,
        CompileOptions {
            pretty: true,
            ..CompileOptions::default()
        },
    );
    assert_eq!(html, "<p>a</p>\n<hr />\n");
}

#[test]
fn test_heading_anchors_match_compiled_ids() {
    let doc = doc_with(&[(BlockType::Heading1, "Q&A"), (BlockType::Heading1, "Q&A")]);
    let slugs: Vec<_> = heading_anchors(&doc).into_iter().map(|a| a.slug).collect();
    assert_eq!(slugs, vec!["qa", "qa-1"]);
    let html = compile(&doc);
    assert!(html.contains("id=\"qa\"") && html.contains("id=\"qa-1\""));
}

#[test]
fn test_compile_options_from_json() {
    let options: CompileOptions = serde_json::from_str(r#"{"pretty":true}"#).unwrap();
    assert!(options.pretty);
    assert_eq!(options.indent, "  ");
}
