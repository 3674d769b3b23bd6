use nfc_tag_reader::cards::CardKind;
use nfc_tag_reader::technology::{
    MifareClassicInfo, MifareClassicType, MifareUltralightType, TECH_MIFARE_CLASSIC,
    TECH_MIFARE_ULTRALIGHT,
};
use nfc_tag_reader::{ResolvedDetails, TechError, describe};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn describes_classic_1k_card() {
    let kind = CardKind::Classic { size: 1024 };
    let report = describe(&[0xDE, 0xAD, 0xBE, 0xEF], &kind.technologies(), &kind.details());
    assert_eq!(
        report,
        "ID (hex): EF BE AD DE\n\
         ID (reversed hex): DE AD BE EF\n\
         ID (dec): 4022250974\n\
         ID (reversed dec): 3735928559\n\
         Technologies: NfcA, MifareClassic, Ndef\n\
         Mifare Classic type: Classic\n\
         Mifare size: 1024 bytes\n\
         Mifare sectors: 16\n\
         Mifare blocks: 64"
    );
}

#[test]
fn never_panics_for_any_identifier_length() {
    let techs = names(&[
        TECH_MIFARE_CLASSIC,
        TECH_MIFARE_ULTRALIGHT,
        "x",
        "",
        "android.nfc.tech.",
        "com.vendor.Proprietary",
    ]);
    let details = ResolvedDetails::default();
    for len in 0..=32 {
        let id: Vec<u8> = (0..len).map(|i| (i * 37) as u8).collect();
        let report = describe(&id, &techs, &details);
        assert!(report.contains("Technologies: MifareClassic, MifareUltralight, x, , , com.vendor.Proprietary"));
    }
}

#[test]
fn ten_byte_identifier_keeps_full_precision() {
    let id = [0xFF; 10];
    let report = describe(&id, &[], &ResolvedDetails::default());
    assert!(report.contains("ID (dec): 1208925819614629174706175\n"));
    assert!(report.contains("ID (reversed dec): 1208925819614629174706175\n"));
}

#[test]
fn each_technology_renders_its_own_branch() {
    let details = ResolvedDetails {
        classic: MifareClassicInfo::from_size(MifareClassicType::Pro, 4096),
        ultralight: Err(TechError::Transceive("Tag was lost.".into())),
    };
    let report = describe(
        &[0x01],
        &names(&[TECH_MIFARE_ULTRALIGHT, TECH_MIFARE_CLASSIC]),
        &details,
    );
    let tail = report.split_once("Technologies: ").unwrap().1;
    assert_eq!(
        tail,
        "MifareUltralight, MifareClassic\n\
         Mifare ultralight error: Tag was lost.\n\
         Mifare Classic type: Pro\n\
         Mifare size: 4096 bytes\n\
         Mifare sectors: 40\n\
         Mifare blocks: 256"
    );
}

#[test]
fn unknown_subtypes_use_unknown_label() {
    let details = ResolvedDetails {
        classic: MifareClassicInfo::from_size(MifareClassicType::Unknown, 320),
        ultralight: Ok(MifareUltralightType::Unknown),
    };
    let report = describe(
        &[],
        &names(&[TECH_MIFARE_CLASSIC, TECH_MIFARE_ULTRALIGHT]),
        &details,
    );
    assert!(report.contains("Mifare Classic type: Unknown\n"));
    assert!(report.ends_with("Mifare Ultralight type: Unknown"));
}
