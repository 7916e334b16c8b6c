use pretty_assertions::assert_eq;
use uexp_table::{
    ActiveEditor, CellContent, CellEditor, CellKey, CellRef, DecodedPackage, Direction,
    DisplayMode, EditError, EditorConfig, EditorSession, OriginalEntry, PatchValue,
    PropertyDescriptor, PropertyType, Scalar, TextResources, ValidationError, Value,
};

fn text(s: &str) -> Value {
    Value::Scalar(Scalar::Text(s.to_string()))
}

fn int(v: i64) -> Value {
    Value::Scalar(Scalar::Int(v))
}

fn monsters() -> DecodedPackage {
    DecodedPackage {
        filename: "Game/Data/Monsters.uexp".to_string(),
        columns: vec![
            PropertyDescriptor::new("Kind", PropertyType::Name, false),
            PropertyDescriptor::new("Hp", PropertyType::Int32, false),
            PropertyDescriptor::new("Label", PropertyType::String, false),
            PropertyDescriptor::new("Resist_Array", PropertyType::Byte, true),
        ],
        rows: vec![
            OriginalEntry::new("M_Slime")
                .with("Kind", text("Foo"))
                .with("Hp", int(30))
                .with("Label", text("TXT_SLIME"))
                .with(
                    "Resist_Array",
                    Value::Array(vec![Scalar::Int(0), Scalar::Int(50)]),
                ),
            OriginalEntry::new("M_Bat")
                .with("Kind", text("Bar"))
                .with("Hp", int(12))
                .with("Label", text("TXT_BAT"))
                .with(
                    "Resist_Array",
                    Value::Array(vec![Scalar::Int(10), Scalar::Int(20)]),
                ),
        ],
        name_set: vec!["Foo".to_string(), "Bar".to_string()],
    }
}

fn session() -> EditorSession {
    let resources: TextResources = [("Foo", "Friendly Foo"), ("TXT_SLIME", "Slime")]
        .into_iter()
        .collect();
    let mut session = EditorSession::new(EditorConfig::default(), resources);
    session.load(monsters());
    session
}

#[test]
fn name_selector_scenario() {
    let mut s = session();
    let key = CellKey::scalar(0, 0);

    let labels: Vec<String> = match s.focus(key).unwrap() {
        ActiveEditor::Choice { choice, .. } => {
            choice.options.iter().map(|o| o.label.clone()).collect()
        }
        other => panic!("expected a selector, got {other:?}"),
    };
    assert_eq!(labels, vec!["Friendly Foo", "Bar"]);

    s.select_name("Bar").unwrap();
    assert_eq!(s.blur(), Some(key));

    let cell = s.cell(key).unwrap();
    assert!(cell.dirty);
    assert_eq!(cell.content, CellContent::Name("Bar".to_string()));

    let view = s.view().unwrap();
    assert_eq!(view.text(key).as_deref(), Some("Bar"));
    assert_eq!(view.tooltip(key), None);
}

#[test]
fn save_emits_only_dirty_fields() {
    let mut s = session();

    s.focus(CellKey::scalar(1, 1)).unwrap();
    s.input("2147483648").unwrap();
    s.navigate(Direction::Up).unwrap();
    s.input("31").unwrap();
    s.blur();

    let over = s.cell(CellKey::scalar(1, 1)).unwrap();
    assert_eq!(
        over.invalid,
        Some(ValidationError::OutOfRange {
            min: i32::MIN as i64,
            max: i32::MAX as i64
        })
    );
    assert_eq!(
        over.invalid.unwrap().to_string(),
        "Value must be between -2,147,483,648 and 2,147,483,647"
    );

    let patch = s.save().unwrap();
    assert_eq!(patch.len(), 2);
    assert_eq!(patch[0].tag, "M_Slime");
    assert_eq!(patch[0].fields.len(), 1);
    assert_eq!(
        patch[0].get("Hp"),
        Some(&PatchValue::Scalar(Scalar::Int(31)))
    );
    // Invalid values are still written.
    assert_eq!(
        patch[1].get("Hp"),
        Some(&PatchValue::Scalar(Scalar::Int(2_147_483_648)))
    );
}

#[test]
fn editing_back_restores_a_clean_patch() {
    let mut s = session();
    let key = CellKey::element(0, 3, 1);

    s.focus(key).unwrap();
    s.input("99").unwrap();
    s.blur();
    assert!(s.cell(key).unwrap().dirty);

    s.focus(key).unwrap();
    s.input("50").unwrap();
    s.blur();
    assert!(!s.cell(key).unwrap().dirty);

    let patch = s.save().unwrap();
    assert!(patch.iter().all(|e| e.is_unchanged()));
}

#[test]
fn export_materializes_raw_identifiers() {
    let mut s = session();
    s.set_display_mode(DisplayMode::Values);

    let entries = s.export().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0].get("Label"),
        Some(&PatchValue::Scalar(Scalar::Text("TXT_SLIME".to_string())))
    );
    assert_eq!(
        entries[1].get("Resist_Array"),
        Some(&PatchValue::Array(vec![
            Some(Scalar::Int(10)),
            Some(Scalar::Int(20))
        ]))
    );

    let csv = s.export_delimited().unwrap();
    assert_eq!(
        csv,
        "$tag,Kind,Hp,Label,Resist_Array\n\
         M_Slime,Foo,30,TXT_SLIME,\"0, 50\"\n\
         M_Bat,Bar,12,TXT_BAT,\"10, 20\"\n"
    );
}

#[test]
fn display_mode_only_changes_rendering() {
    let mut s = session();
    let key = CellKey::scalar(0, 2);

    assert_eq!(s.view().unwrap().text(key).as_deref(), Some("Slime"));
    assert_eq!(s.toggle_display_mode(), DisplayMode::Ids);
    assert_eq!(s.view().unwrap().text(key).as_deref(), Some("TXT_SLIME"));
    assert_eq!(
        s.view().unwrap().tooltip(key).as_deref(),
        Some("Slime")
    );
    assert_eq!(
        s.cell(key).unwrap().content,
        CellContent::Text("TXT_SLIME".to_string())
    );
    assert_eq!(s.editor().unwrap().dirty_count(), 0);
}

#[test]
fn string_cells_refuse_focus() {
    let mut s = session();
    assert_eq!(
        s.focus(CellKey::scalar(0, 2)).unwrap_err(),
        EditError::ReadOnly(CellKey::scalar(0, 2))
    );
    assert_eq!(s.input("1"), Err(EditError::NotEditing));
}

#[test]
fn reselecting_the_original_name_clears_dirty() {
    let mut s = session();
    let key = CellKey::scalar(0, 0);

    s.focus(key).unwrap();
    s.select_name("Bar").unwrap();
    s.blur();
    assert!(s.cell(key).unwrap().dirty);

    s.focus(key).unwrap();
    s.select_name("Foo").unwrap();
    s.blur();
    assert!(!s.cell(key).unwrap().dirty);

    let patch = s.save().unwrap();
    assert_eq!(patch[0].tag, "M_Slime");
    assert!(patch[0].is_unchanged());
}

#[test]
fn commit_name_rejects_values_outside_the_name_set() {
    let s = session();
    let table = s.table().unwrap();
    let mut editor = CellEditor::render(table);
    let key = CellKey::scalar(1, 0);

    assert_eq!(
        editor.commit_name(table, key, "Baz").unwrap_err(),
        EditError::NotInNameSet("Baz".to_string())
    );
    assert!(!editor.is_dirty(key));

    assert!(editor.commit_name(table, key, "Foo").unwrap().dirty);
    assert!(!editor.commit_name(table, key, "Bar").unwrap().dirty);
}

#[test]
fn open_search_follows_display_mode_and_resources() {
    let mut s = session();
    s.open_find();
    s.set_find_pattern("slime");
    // Tag `M_Slime` plus the label rendered as `Slime`.
    assert_eq!(s.find().len(), 2);

    s.set_display_mode(DisplayMode::Ids);
    assert_eq!(s.find().len(), 2);
    s.set_find_pattern("friendly");
    assert!(s.find().is_empty());

    s.set_display_mode(DisplayMode::Values);
    assert_eq!(
        s.find().matches().collect::<Vec<_>>(),
        vec![CellRef::property(0, 0)]
    );

    s.set_resources(TextResources::new());
    assert!(s.find().is_empty());
    assert!(s.find().is_open());
}
