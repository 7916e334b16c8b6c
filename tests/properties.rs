use pretty_assertions::assert_eq;
use uexp_table::{
    CellEditor, CellKey, CellRef, DecodedPackage, DisplayMode, ExtractOptions, FindIndex,
    OriginalEntry, PatchValue, PropertyDescriptor, PropertyType, RecordTable, Scalar,
    TextResources, ValidationError, Value, extract_entries,
};

const NUMERIC: [(PropertyType, Scalar); 6] = [
    (PropertyType::Boolean, Scalar::Int(1)),
    (PropertyType::Byte, Scalar::Int(200)),
    (PropertyType::BooleanByte, Scalar::Int(0)),
    (PropertyType::Uint16, Scalar::Int(-5)),
    (PropertyType::Int32, Scalar::Int(-2_000_000)),
    (PropertyType::Float, Scalar::Float(0.1)),
];

fn numeric_table() -> RecordTable {
    let columns = NUMERIC
        .iter()
        .enumerate()
        .map(|(i, (ty, _))| PropertyDescriptor::new(format!("N{i}"), *ty, false))
        .collect();
    let mut row = OriginalEntry::new("Row_0");
    for (i, (_, v)) in NUMERIC.iter().enumerate() {
        row = row.with(format!("N{i}"), Value::Scalar(v.clone()));
    }
    RecordTable::new(DecodedPackage {
        filename: "Numbers.uexp".to_string(),
        columns,
        rows: vec![row],
        name_set: vec![],
    })
}

#[test]
fn committing_rendered_text_never_marks_dirty() {
    let table = numeric_table();
    let resources = TextResources::new();
    let mut editor = CellEditor::render(&table);

    for column in 0..NUMERIC.len() {
        editor
            .focus(&table, &resources, DisplayMode::Values, CellKey::scalar(0, column))
            .unwrap();
    }
    editor.blur(&table);

    let patch = extract_entries(&table, &mut editor, ExtractOptions::SAVE);
    assert_eq!(patch.len(), 1);
    assert!(patch[0].is_unchanged());
}

#[test]
fn byte_like_boundaries() {
    let table = numeric_table();
    let mut editor = CellEditor::render(&table);

    for column in 0..3 {
        let key = CellKey::scalar(0, column);
        for ok in ["0", "255", "17"] {
            assert_eq!(editor.commit_text(&table, key, ok).unwrap().invalid, None);
        }
        for bad in ["256", "-1"] {
            assert_eq!(
                editor.commit_text(&table, key, bad).unwrap().invalid,
                Some(ValidationError::OutOfRange { min: 0, max: 255 })
            );
        }
    }
}

#[test]
fn int32_and_uint16_boundaries() {
    let table = numeric_table();
    let mut editor = CellEditor::render(&table);
    let int32 = CellKey::scalar(0, 4);
    let uint16 = CellKey::scalar(0, 3);

    assert_eq!(
        editor.commit_text(&table, int32, "2147483647").unwrap().invalid,
        None
    );
    assert!(
        editor
            .commit_text(&table, int32, "2147483648")
            .unwrap()
            .invalid
            .is_some()
    );

    assert_eq!(
        editor.commit_text(&table, uint16, "-32768").unwrap().invalid,
        None
    );
    let cell = editor.commit_text(&table, uint16, "40000").unwrap();
    assert_eq!(
        cell.invalid.map(|e| e.to_string()).as_deref(),
        Some("Value must be between -32,768 and 32,767")
    );
}

#[test]
fn float_accepts_any_number_and_blank_but_not_text() {
    let table = numeric_table();
    let mut editor = CellEditor::render(&table);
    let key = CellKey::scalar(0, 5);

    assert_eq!(editor.commit_text(&table, key, "1e300").unwrap().invalid, None);
    assert_eq!(
        editor.commit_text(&table, key, "abc").unwrap().invalid,
        Some(ValidationError::NotANumber)
    );
    assert_eq!(editor.commit_text(&table, key, "").unwrap().invalid, None);
}

#[test]
fn cleared_numeric_cell_saves_zero() {
    let table = numeric_table();
    let mut editor = CellEditor::render(&table);
    let byte = CellKey::scalar(0, 1);

    let cell = editor.commit_text(&table, byte, "").unwrap();
    assert!(cell.dirty);
    assert_eq!(cell.invalid, None);

    let patch = extract_entries(&table, &mut editor, ExtractOptions::SAVE);
    assert_eq!(
        patch[0].get("N1"),
        Some(&PatchValue::Scalar(Scalar::Int(0)))
    );
}

#[test]
fn micro_floats_round_trip_through_their_decimal_text() {
    let table = RecordTable::new(DecodedPackage {
        filename: "Tuning.uexp".to_string(),
        columns: vec![PropertyDescriptor::new("Drift", PropertyType::Float, false)],
        rows: vec![OriginalEntry::new("T0").with("Drift", Value::Scalar(Scalar::Float(1e-6)))],
        name_set: vec![],
    });
    let mut editor = CellEditor::render(&table);
    let key = CellKey::scalar(0, 0);

    let cell = editor.commit_text(&table, key, "0.000001").unwrap();
    assert!(!cell.dirty);
    assert_eq!(cell.invalid, None);
}

fn inventory() -> RecordTable {
    let rows = (0..7)
        .map(|i| {
            let item = match i {
                2 => "Iron Needle",
                5 => "needle (rusty)",
                _ => "Potion",
            };
            OriginalEntry::new(format!("Inv_{i}"))
                .with("Item", Value::Scalar(Scalar::Text(item.to_string())))
                .with(
                    "Count_Array",
                    Value::Array(vec![Scalar::Int(i), Scalar::Int(i * 2)]),
                )
        })
        .collect();
    RecordTable::new(DecodedPackage {
        filename: "Inventory.uexp".to_string(),
        columns: vec![
            PropertyDescriptor::new("Item", PropertyType::String, false),
            PropertyDescriptor::new("Count_Array", PropertyType::Uint16, true),
        ],
        rows,
        name_set: vec![],
    })
}

#[test]
fn full_extraction_populates_every_field() {
    let table = inventory();
    let mut editor = CellEditor::render(&table);
    let entries = extract_entries(&table, &mut editor, ExtractOptions::EXPORT);

    assert_eq!(entries.len(), table.row_count());
    for (row, entry) in entries.iter().enumerate() {
        assert_eq!(entry.fields.len(), 2);
        let Some(PatchValue::Array(counts)) = entry.get("Count_Array") else {
            panic!("row {row} has no array");
        };
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(Option::is_some));
    }
}

#[test]
fn find_orders_matches_by_row() {
    let table = inventory();
    let resources = TextResources::new();
    let editor = CellEditor::render(&table);
    let view = editor.view(&table, &resources, DisplayMode::Values, ", ");

    let mut find = FindIndex::new();
    find.open(&view);
    find.set_pattern("NEEDLE", &view);
    assert_eq!(
        find.matches().collect::<Vec<_>>(),
        vec![CellRef::property(2, 0), CellRef::property(5, 0)]
    );

    find.set_pattern("", &view);
    assert!(find.is_empty());

    // Array cells are searched as their joined text.
    find.set_pattern("6, 12", &view);
    assert_eq!(
        find.matches().collect::<Vec<_>>(),
        vec![CellRef::property(6, 1)]
    );

    find.set_pattern("(rusty", &view);
    assert_eq!(find.len(), 1);
}
