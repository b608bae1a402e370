// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Tests for neorom-config layouts

#[cfg(test)]
mod tests {
    use neorom_config::{AREAS, AreaLayout, MemoryArea, RomChip, TitleLayout};
    use strum::IntoEnumIterator;

    fn garou_c() -> AreaLayout {
        AreaLayout::new(
            0x4000000,
            vec![
                RomChip::new("253-c1.c1", 0x800000, 0x497be3f2),
                RomChip::new("253-c2.c2", 0x800000, 0x6a9e95ca),
                RomChip::new("253-c3.c3", 0x800000, 0x39373d2f),
                RomChip::new("253-c4.c4", 0x800000, 0x4de23f6c),
            ],
        )
    }

    #[test]
    fn test_area_count_and_order() {
        assert_eq!(AREAS, 6);
        let areas: Vec<MemoryArea> = MemoryArea::iter().collect();
        assert_eq!(
            areas,
            vec![
                MemoryArea::P,
                MemoryArea::S,
                MemoryArea::M,
                MemoryArea::V1,
                MemoryArea::V2,
                MemoryArea::C
            ]
        );
        for (ii, area) in areas.iter().enumerate() {
            assert_eq!(area.index(), ii);
        }
    }

    #[test]
    fn test_area_names() {
        assert_eq!(MemoryArea::P.name(), "p");
        assert_eq!(MemoryArea::V1.name(), "v1");
        assert_eq!(MemoryArea::V2.to_string(), "v2");
        assert_eq!(MemoryArea::try_from_str("V1"), Some(MemoryArea::V1));
        assert_eq!(MemoryArea::try_from_str("c"), Some(MemoryArea::C));
        assert_eq!(MemoryArea::try_from_str("v3"), None);
        assert_eq!(MemoryArea::try_from_str(""), None);
    }

    #[test]
    fn test_pad_size_is_largest_chip() {
        let area = AreaLayout::new(
            0x600000,
            vec![
                RomChip::new("v1.v1", 0x400000, 0),
                RomChip::new("v2.v2", 0x200000, 0),
            ],
        );
        assert_eq!(area.pad_size(), 0x400000);
        assert_eq!(area.chip_count(), 2);

        // Declared size plays no part
        let area = AreaLayout::new(0x10, vec![RomChip::new("s1.s1", 0x20000, 0)]);
        assert_eq!(area.pad_size(), 0x20000);
    }

    #[test]
    fn test_empty_area() {
        let area = AreaLayout::default();
        assert!(area.is_empty());
        assert_eq!(area.pad_size(), 0);
    }

    #[test]
    fn test_title_indexing() {
        let layout = TitleLayout::default().with_area(MemoryArea::C, garou_c());
        assert_eq!(layout[MemoryArea::C].chip_count(), 4);
        assert!(layout[MemoryArea::P].is_empty());
        assert_eq!(layout.area(MemoryArea::C), &layout.c);
        assert_eq!(layout.chip_count(), 4);
    }

    #[test]
    fn test_layout_from_json() {
        let json = r#"{
            "parent": "garou",
            "p": {
                "size": 9437184,
                "chips": [
                    { "name": "253-ep1.p1", "size": 1048576, "crc": 3926446403 },
                    { "name": "253-p1.p1", "size": 4194304 }
                ]
            },
            "v2": { "size": 0 }
        }"#;
        let layout: TitleLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.parent, "garou");
        assert_eq!(layout.p.size, 9437184);
        assert_eq!(layout.p.chips[0].name, "253-ep1.p1");
        assert_eq!(layout.p.chips[0].crc, 3926446403);
        assert_eq!(layout.p.chips[1].crc, 0);
        assert!(layout.v2.is_empty());
        assert!(layout.c.is_empty());
    }

    #[test]
    fn test_layout_json_round_trip() {
        let layout = TitleLayout {
            parent: "kof99".to_string(),
            ..Default::default()
        }
        .with_area(MemoryArea::C, garou_c());
        let json = serde_json::to_string(&layout).unwrap();
        let parsed: TitleLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn test_chip_missing_size_rejected() {
        let json = r#"{ "p": { "size": 1, "chips": [ { "name": "p1" } ] } }"#;
        assert!(serde_json::from_str::<TitleLayout>(json).is_err());
    }

    #[test]
    fn test_area_json_names() {
        let json = serde_json::to_string(&MemoryArea::V1).unwrap();
        assert_eq!(json, "\"v1\"");
        let area: MemoryArea = serde_json::from_str("\"c\"").unwrap();
        assert_eq!(area, MemoryArea::C);
    }
}
