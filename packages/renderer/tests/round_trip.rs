//! Serialize with the HTML compiler, render back, compare

use blockpost_compiler_html::{compile_document, CompileOptions};
use blockpost_editor::{BlockType, CodeLanguage, Document, Mutation};
use blockpost_renderer::{
    BlockRole, ClientSideDiagrams, DocumentViewport, NavigationOutcome, NoDiagrams, Renderer,
    TocNavigator,
};
use std::time::Duration;

fn one_of_each() -> Document {
    let blocks = [
        (BlockType::Paragraph, "Hello <b>there</b>"),
        (BlockType::Heading1, "Intro"),
        (BlockType::Heading2, "Setup & install"),
        (BlockType::Heading3, "Intro"),
        (BlockType::Code, "let answer = 42;"),
        (BlockType::Image, "https://img.example.com/a.png"),
        (BlockType::Table, ""),
        (BlockType::BulletedList, "one\ntwo"),
        (BlockType::NumberedList, "first"),
        (BlockType::Callout, "Remember this"),
        (BlockType::Quote, "To be or not"),
        (BlockType::TableOfContents, ""),
        (BlockType::Separator, ""),
    ];
    let mut doc = Document::new("drafts/round-trip");
    for (i, (block_type, content)) in blocks.iter().enumerate() {
        doc.insert_block(i, *block_type, content);
    }
    doc.remove_block(0);
    doc
}

#[test]
fn test_round_trip_preserves_block_count_and_headings() {
    let doc = one_of_each();
    for pretty in [false, true] {
        let html = compile_document(
            &doc,
            CompileOptions {
                pretty,
                ..CompileOptions::default()
            },
        );
        let rendered = Renderer::new(&NoDiagrams).render(&html);

        assert_eq!(rendered.blocks.len(), doc.len(), "pretty = {}", pretty);

        let expected: Vec<String> = doc.headings().map(|(_, b)| b.plain_text()).collect();
        let actual: Vec<String> = rendered.headings.iter().map(|h| h.text.clone()).collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_round_trip_roles_follow_block_order() {
    let doc = one_of_each();
    let html = compile_document(&doc, CompileOptions::default());
    let rendered = Renderer::new(&NoDiagrams).render(&html);

    let roles: Vec<BlockRole> = rendered.blocks.iter().map(|b| b.role).collect();
    assert_eq!(roles[0], BlockRole::Paragraph);
    assert_eq!(roles[1], BlockRole::Heading(1));
    assert_eq!(roles[4], BlockRole::Code);
    assert_eq!(roles[5], BlockRole::Figure);
    assert_eq!(roles[6], BlockRole::Table);
    assert!(matches!(roles[9], BlockRole::Callout(_)));
    assert_eq!(roles[10], BlockRole::Quote);
    assert_eq!(roles[11], BlockRole::TableOfContents);
    assert_eq!(roles[12], BlockRole::Separator);
}

#[test]
fn test_compiled_heading_ids_survive_rendering() {
    let doc = one_of_each();
    let html = compile_document(&doc, CompileOptions::default());
    let rendered = Renderer::new(&NoDiagrams).render(&html);

    let ids: Vec<&str> = rendered.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["intro", "setup-install", "intro-1"]);
}

#[tokio::test]
async fn test_toc_scenario_links_and_navigates() {
    let mut doc = Document::new("drafts/toc");
    let heading = doc.insert_block(0, BlockType::Heading1, "");
    doc.update_block_content(&heading, "Intro");
    // TOC before the heading it links to
    doc.insert_block(0, BlockType::TableOfContents, "");
    doc.remove_block(0);

    let html = compile_document(&doc, CompileOptions::default());
    let rendered = Renderer::new(&NoDiagrams).render(&html);

    let entries = rendered.toc_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Intro");
    let toc_html = rendered.blocks[0].node.to_html();
    assert!(toc_html.contains(&format!("href=\"#{}\"", entries[0].id)));

    let mut viewport = DocumentViewport::new(&rendered);
    let outcome = TocNavigator::with_retry_delay(Duration::from_millis(1))
        .navigate(&mut viewport, &entries[0].id)
        .await;
    assert_eq!(outcome, NavigationOutcome::Focused);
    assert_eq!(viewport.focused(), Some(entries[0].id.as_str()));
}

#[test]
fn test_mermaid_block_through_client_side_diagrams() {
    let mut doc = Document::new("drafts/diagram");
    let code = doc.insert_block(0, BlockType::Code, "graph TD; A-->B");
    doc.apply(Mutation::SetCodeLanguage {
        id: code,
        language: CodeLanguage::Mermaid,
    });

    let html = compile_document(&doc, CompileOptions::default());
    let rendered = Renderer::new(&ClientSideDiagrams).render(&html);

    assert_eq!(rendered.blocks[1].role, BlockRole::Diagram);
    assert!(rendered.to_html().contains("<pre class=\"mermaid\" id=\"diagram-0\">graph TD; A--&gt;B</pre>"));
}
