//! Integration tests for editor sessions

use blockpost_editor::{
    BlockId, BlockKind, BlockType, CodeLanguage, DiagramPreview, Document, EditSession,
    EffectError, ImageFile, Key, KeyEvent, KeyOutcome, Mutation, SlashMenu,
};

fn session_with(types: &[(BlockType, &str)]) -> (EditSession, Vec<BlockId>) {
    let mut doc = Document::new("drafts/integration");
    let mut ids = vec![doc.blocks()[0].id().clone()];
    for (i, (block_type, content)) in types.iter().enumerate() {
        ids.push(doc.insert_block(i, *block_type, content));
    }
    (EditSession::new(doc), ids)
}

fn enter() -> KeyEvent {
    KeyEvent::new(Key::Enter)
}

#[test]
fn test_list_double_enter_exits_list() {
    let (mut session, ids) = session_with(&[(BlockType::BulletedList, "first")]);
    let list = &ids[1];

    // Enter on a filled item opens a new empty one
    assert_eq!(session.key_down(list, enter()), KeyOutcome::Handled);
    assert_eq!(
        session.document().block(list).unwrap().content(),
        "<ul><li>first</li><li></li></ul>"
    );

    // First Enter on the empty item only arms the exit
    session.key_down(list, enter());
    assert_eq!(session.document().len(), 2);

    session.key_down(list, enter());
    let doc = session.document();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.block(list).unwrap().content(), "<ul><li>first</li></ul>");
    assert_eq!(doc.blocks()[2].block_type(), BlockType::Paragraph);
    assert_eq!(doc.focus(), Some(doc.blocks()[2].id()));
}

#[test]
fn test_other_key_resets_list_exit() {
    let (mut session, ids) = session_with(&[(BlockType::NumberedList, "")]);
    let list = &ids[1];

    session.key_down(list, enter());
    session.key_down(list, KeyEvent::new(Key::Other));
    session.key_down(list, enter());

    // Tracker was reset, so the second Enter only re-armed it
    assert_eq!(session.document().len(), 2);

    session.key_down(list, enter());
    assert_eq!(session.document().len(), 3);
}

#[test]
fn test_enter_in_another_block_resets_list_exit() {
    let (mut session, ids) = session_with(&[(BlockType::BulletedList, "a")]);
    let paragraph = &ids[0];
    let list = &ids[1];

    session.key_down(list, enter());
    session.key_down(list, enter());
    session.key_down(paragraph, enter());
    assert_eq!(session.document().len(), 3);

    // Back in the list, one Enter only arms the exit again
    session.key_down(list, enter());
    let doc = session.document();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.block(list).unwrap().content(), "<ul><li>a</li><li></li></ul>");

    session.key_down(list, enter());
    assert_eq!(session.document().len(), 4);
}

#[test]
fn test_backspace_on_empty_block_removes_it() {
    let (mut session, ids) = session_with(&[(BlockType::Paragraph, "")]);

    let outcome = session.key_down(&ids[1], KeyEvent::new(Key::Backspace));

    assert_eq!(outcome, KeyOutcome::Handled);
    assert_eq!(session.document().len(), 1);
    assert_eq!(session.take_focus(), Some(ids[0].clone()));
}

#[test]
fn test_backspace_on_last_block_is_refused() {
    let (mut session, ids) = session_with(&[]);

    session.key_down(&ids[0], KeyEvent::new(Key::Backspace));

    assert_eq!(session.document().len(), 1);
}

#[test]
fn test_backspace_with_text_passes_through() {
    let (mut session, ids) = session_with(&[(BlockType::Paragraph, "text")]);

    let outcome = session.key_down(&ids[1], KeyEvent::new(Key::Backspace));

    assert_eq!(outcome, KeyOutcome::PassThrough);
    assert_eq!(session.document().len(), 2);
}

#[test]
fn test_arrows_move_focus_in_document_order() {
    let (mut session, ids) = session_with(&[
        (BlockType::Paragraph, "b"),
        (BlockType::Quote, "c"),
    ]);

    assert_eq!(session.key_down(&ids[1], KeyEvent::new(Key::ArrowDown)), KeyOutcome::Handled);
    assert_eq!(session.take_focus(), Some(ids[2].clone()));

    assert_eq!(session.key_down(&ids[1], KeyEvent::new(Key::ArrowUp)), KeyOutcome::Handled);
    assert_eq!(session.take_focus(), Some(ids[0].clone()));

    assert_eq!(
        session.key_down(&ids[0], KeyEvent::new(Key::ArrowUp)),
        KeyOutcome::PassThrough
    );
}

#[test]
fn test_code_and_table_keys_pass_through() {
    let (mut session, ids) = session_with(&[(BlockType::Code, ""), (BlockType::Table, "")]);

    assert_eq!(session.key_down(&ids[1], enter()), KeyOutcome::PassThrough);
    assert_eq!(
        session.key_down(&ids[2], KeyEvent::new(Key::Backspace)),
        KeyOutcome::PassThrough
    );
    assert_eq!(session.document().len(), 3);
}

#[test]
fn test_slash_heading_keeps_trailing_text() {
    let (mut session, ids) = session_with(&[]);
    session.input(&ids[0], "/h2 Setup");
    session.input(&ids[0], "/h2");

    session.key_down(&ids[0], enter());

    let block = session.document().block(&ids[0]).unwrap();
    assert_eq!(block.block_type(), BlockType::Heading2);
    assert_eq!(block.content(), "");
}

#[test]
fn test_leaving_slash_closes_menu() {
    let (mut session, ids) = session_with(&[]);
    session.input(&ids[0], "/ta");
    assert!(session.slash_menu().is_open_for(&ids[0]));

    session.input(&ids[0], "ta");

    assert_eq!(session.slash_menu(), &SlashMenu::Closed);
}

#[test]
fn test_select_command_table_inserts_table_after() {
    let (mut session, ids) = session_with(&[]);
    session.input(&ids[0], "/table");
    let command = session.menu_commands()[0];

    let result = session.select_command(&ids[0], command);

    assert_eq!(session.document().len(), 2);
    assert_eq!(
        session.document().block(&result.created.unwrap()).unwrap().block_type(),
        BlockType::Table
    );
    assert!(!session.slash_menu().is_open());
}

#[test]
fn test_separator_token_from_input() {
    let (mut session, ids) = session_with(&[(BlockType::Paragraph, "")]);

    session.input(&ids[1], "---");

    assert_eq!(session.document().blocks()[1].kind, BlockKind::Separator);
}

#[test]
fn test_copy_text_per_block_kind() {
    let (mut session, ids) = session_with(&[
        (BlockType::Code, "let x = 1 < 2;"),
        (BlockType::Image, "https://cdn.example.com/cat.png"),
        (BlockType::Table, ""),
        (BlockType::Paragraph, "<b>Bold</b> move"),
    ]);
    session.apply(Mutation::SetCell {
        id: ids[3].clone(),
        row: 0,
        col: 0,
        value: "a".to_string(),
    });

    assert_eq!(session.copy_text(&ids[0]), None);
    assert_eq!(session.copy_text(&ids[1]).as_deref(), Some("let x = 1 < 2;"));
    assert_eq!(
        session.copy_text(&ids[2]).as_deref(),
        Some("https://cdn.example.com/cat.png")
    );
    assert_eq!(session.copy_text(&ids[3]).as_deref(), Some("a\t\t\n\t\t\n\t\t"));
    assert_eq!(session.copy_text(&ids[4]).as_deref(), Some("Bold move"));
}

#[test]
fn test_image_read_applies_data_uri() {
    let (mut session, ids) = session_with(&[(BlockType::Image, "")]);
    let ticket = session.begin_image_read(&ids[1]).unwrap();

    let applied = session.complete_image_read(ticket, Ok(ImageFile::new("image/png", b"hi".to_vec())));

    assert!(applied);
    assert!(matches!(
        &session.document().block(&ids[1]).unwrap().kind,
        BlockKind::Image { src, .. } if src == "data:image/png;base64,aGk="
    ));
    assert_eq!(session.pending_effects(), 0);
}

#[test]
fn test_stale_image_read_is_dropped() {
    let (mut session, ids) = session_with(&[(BlockType::Image, "")]);
    let old = session.begin_image_read(&ids[1]).unwrap();
    let new = session.begin_image_read(&ids[1]).unwrap();

    assert!(!session.complete_image_read(old, Ok(ImageFile::new("image/png", vec![1]))));
    assert!(session.complete_image_read(new, Ok(ImageFile::new("image/gif", vec![2]))));

    assert!(matches!(
        &session.document().block(&ids[1]).unwrap().kind,
        BlockKind::Image { src, .. } if src.starts_with("data:image/gif;")
    ));
}

#[test]
fn test_result_for_removed_block_is_dropped() {
    let (mut session, ids) = session_with(&[(BlockType::Image, "")]);
    let ticket = session.begin_image_read(&ids[1]).unwrap();
    session.apply(Mutation::RemoveBlockById { id: ids[1].clone() });

    assert!(!session.complete_image_read(ticket, Ok(ImageFile::new("image/png", vec![]))));
    assert_eq!(session.document().len(), 1);
}

#[test]
fn test_diagram_failure_keeps_source() {
    let (mut session, ids) = session_with(&[(BlockType::Code, "graph TD; A-->")]);
    session.apply(Mutation::SetCodeLanguage {
        id: ids[1].clone(),
        language: CodeLanguage::Mermaid,
    });

    let (ticket, source) = session.begin_diagram(&ids[1]).unwrap();
    assert_eq!(source, "graph TD; A-->");
    session.complete_diagram(ticket, Err(EffectError::Diagram("parse error".to_string())));

    match session.diagram_preview(&ids[1]) {
        Some(DiagramPreview::Failed { source, .. }) => assert_eq!(source, "graph TD; A-->"),
        other => panic!("unexpected preview {:?}", other),
    }
}

#[test]
fn test_begin_diagram_requires_mermaid() {
    let (mut session, ids) = session_with(&[(BlockType::Code, "console.log(1)")]);
    assert!(session.begin_diagram(&ids[1]).is_none());
}

#[test]
fn test_session_document_survives_json_reload() -> anyhow::Result<()> {
    let (mut session, ids) = session_with(&[(BlockType::Table, ""), (BlockType::Quote, "Said")]);
    session.apply(Mutation::SetCell {
        id: ids[1].clone(),
        row: 1,
        col: 2,
        value: "cell".to_string(),
    });

    let json = session.document().to_json()?;
    let reloaded = Document::from_json(&json)?;

    assert_eq!(reloaded.blocks(), session.document().blocks());
    match &reloaded.blocks()[1].kind {
        BlockKind::Table(table) => assert_eq!(table.cell(1, 2), Some("cell")),
        other => anyhow::bail!("expected a table, got {:?}", other),
    }
    Ok(())
}
