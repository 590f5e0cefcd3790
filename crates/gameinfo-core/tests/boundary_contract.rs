//! End-to-end checks that a producer and a consumer agree on the record layout
//! across every boundary the crate offers.

use std::ffi::{CStr, c_char};

use gameinfo_core::application::ApplicationSummary;
use gameinfo_core::codec::{RecordCodec, decode_record, encode_record};
use gameinfo_core::config::BoundaryConfig;
use gameinfo_core::ffi::{
    GAMEINFO_OK, gameinfo_decode, gameinfo_field_count, gameinfo_field_name,
    gameinfo_field_offset, gameinfo_release,
};
use gameinfo_core::native::{GameInfoNative, NATIVE_LAYOUT, OwnedGameInfo, StringPolicy};
use gameinfo_core::{FIELD_ORDER, Field, FieldValue, GameMetadataRecord, field_order};

fn scenario_record() -> GameMetadataRecord {
    let mut record = GameMetadataRecord::new();
    record.file_size = 1_234_567.0;
    record.title_name = Some("Example Game".to_string());
    record.title_id = Some("0100000000010000".to_string());
    record.developer = Some("Studio X".to_string());
    record.version = Some("1.2.0".to_string());
    record.icon = Some("icon_ref_1".to_string());
    record
}

const EXPECTED_NAMES: [&str; 6] = [
    "FileSize",
    "TitleName",
    "TitleId",
    "Developer",
    "Version",
    "Icon",
];

#[test]
fn populated_scenario_keeps_order_and_values() {
    let record = scenario_record();

    let names: Vec<&str> = field_order().iter().map(|f| f.name()).collect();
    assert_eq!(names, EXPECTED_NAMES);

    assert_eq!(record.file_size, 1_234_567.0);
    assert_eq!(record.title_name.as_deref(), Some("Example Game"));
    assert_eq!(record.title_id.as_deref(), Some("0100000000010000"));
    assert_eq!(record.developer.as_deref(), Some("Studio X"));
    assert_eq!(record.version.as_deref(), Some("1.2.0"));
    assert_eq!(record.icon.as_deref(), Some("icon_ref_1"));
}

#[test]
fn default_scenario_reads_without_error() {
    let record = GameMetadataRecord::new();
    assert_eq!(record.file_size, 0.0);
    for field in &FIELD_ORDER[1..] {
        assert_eq!(record.field(*field), FieldValue::Text(None));
    }
}

#[test]
fn field_order_is_stable_across_calls_and_instances() {
    let first = *field_order();
    let _a = GameMetadataRecord::new();
    let _b = scenario_record();
    assert_eq!(*field_order(), first);
    assert_eq!(first.len(), 6);
}

#[test]
fn every_view_of_the_layout_agrees() {
    assert_eq!(gameinfo_field_count(), FIELD_ORDER.len());
    for (i, field) in FIELD_ORDER.iter().enumerate() {
        assert_eq!(field.name(), EXPECTED_NAMES[i]);
        assert_eq!(NATIVE_LAYOUT[i].field, *field);
        assert_eq!(gameinfo_field_offset(i), NATIVE_LAYOUT[i].offset as isize);

        let c_name = unsafe { CStr::from_ptr(gameinfo_field_name(i)) };
        assert_eq!(c_name.to_str().unwrap(), EXPECTED_NAMES[i]);
    }
}

#[test]
fn field_by_field_copy_roundtrip() {
    let source = scenario_record();
    let mut target = GameMetadataRecord::new();
    for (field, value) in source.fields() {
        target.set_field(field, value).unwrap();
    }
    assert_eq!(target, source);
}

#[test]
fn native_mirror_roundtrip() {
    let record = scenario_record();
    let owned = OwnedGameInfo::from_record(&record).unwrap();
    let back = unsafe { (*owned.as_ptr()).to_record(StringPolicy::Strict) }.unwrap();
    assert_eq!(back, record);
}

/// A native consumer that only knows offsets reads the same values.
#[test]
fn native_reader_by_offset() {
    let record = scenario_record();
    let owned = OwnedGameInfo::from_record(&record).unwrap();
    let base = owned.as_ptr().cast::<u8>();

    let offset = |field: Field| gameinfo_field_offset(field.index());
    let file_size = unsafe { base.offset(offset(Field::FileSize)).cast::<f64>().read() };
    assert_eq!(file_size, 1_234_567.0);

    let developer = unsafe {
        let slot = base.offset(offset(Field::Developer)).cast::<*const c_char>();
        CStr::from_ptr(slot.read())
    };
    assert_eq!(developer.to_str().unwrap(), "Studio X");
}

#[test]
fn wire_then_native_roundtrip() {
    let record = scenario_record();
    let wire = encode_record(&record).unwrap();

    let mut native = GameInfoNative::empty();
    let rc = unsafe { gameinfo_decode(wire.as_ptr(), wire.len(), &mut native) };
    assert_eq!(rc, GAMEINFO_OK);

    let back = unsafe { native.to_record(StringPolicy::Strict) }.unwrap();
    unsafe { gameinfo_release(&mut native) };
    assert_eq!(back, record);
}

#[test]
fn configured_codec_roundtrip() {
    let config = BoundaryConfig::from_toml_str("[codec]\nmax_message_size = 256\n").unwrap();
    config.validate().unwrap();
    let codec = RecordCodec::from_config(&config);
    let record = scenario_record();
    let wire = codec.encode(&record).unwrap();
    assert_eq!(codec.decode(&wire).unwrap(), record);
    assert_eq!(decode_record(&wire).unwrap(), record);
}

#[test]
fn application_summary_to_native() {
    let app = ApplicationSummary {
        title_id: 0x0100_0000_0001_0000,
        name: "Example Game".to_string(),
        developer: "Studio X".to_string(),
        version: "1.2.0".to_string(),
        icon: None,
        size_bytes: 1_234_567,
    };
    let record = GameMetadataRecord::from(&app);
    let owned = OwnedGameInfo::from_record(&record).unwrap();
    let native = owned.as_native();
    assert_eq!(native.file_size, 1_234_567.0);
    assert!(native.icon.is_null());
    let title_id = unsafe { CStr::from_ptr(native.title_id) };
    assert_eq!(title_id.to_str().unwrap(), "0100000000010000");
}
