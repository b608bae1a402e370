// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Tests for the SMA program descrambler

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use neorom_gen::combine::SMA_PREFIX_LEN;
    use neorom_gen::sma::{self, PassOrder, SmaKey};
    use neorom_gen::{AREAS, AreaLayout, Error, MemoryArea, NoCmc, RomChip, Strategy};
    use neorom_gen::{CmcDecrypt, CmcGeneration, TitleLayout};

    // Smallest program chip covering the whole scrambled region
    const CHIP_LEN: usize = 0x840000;

    fn key(title: &str) -> &'static SmaKey {
        Strategy::for_title(title).sma().unwrap()
    }

    fn word(image: &[u8], index: usize) -> u16 {
        u16::from_le_bytes([image[index * 2], image[index * 2 + 1]])
    }

    fn nonzero_words(image: &[u8]) -> Vec<(usize, u16)> {
        image
            .chunks_exact(2)
            .enumerate()
            .map(|(ii, w)| (ii, u16::from_le_bytes([w[0], w[1]])))
            .filter(|(_, w)| *w != 0)
            .collect()
    }

    #[test]
    fn test_pass_orders() {
        assert_eq!(key("garou").pass_order, PassOrder::AddressThenBlocks);
        assert_eq!(key("garouh").pass_order, PassOrder::AddressThenBlocks);
        assert_eq!(key("mslug3").pass_order, PassOrder::AddressThenBlocks);
        assert_eq!(key("mslug3a").pass_order, PassOrder::AddressThenBlocks);
        assert_eq!(key("kof99").pass_order, PassOrder::BlocksThenAddress);
        assert_eq!(key("kof2000").pass_order, PassOrder::BlocksThenAddress);
        assert!(Strategy::for_title("kof99ka").sma().is_none());
    }

    #[test]
    fn test_output_length() {
        let out = sma::decrypt(vec![vec![0; CHIP_LEN]], key("garou")).unwrap();
        assert_eq!(out.len(), SMA_PREFIX_LEN + CHIP_LEN);
        assert!(out.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_garou_vector() {
        let mut chip = vec![0u8; CHIP_LEN];
        // Word 0x388040, inside the relocated boot region
        chip[0x650080] = 0x01;
        // Word 0x80020, the first block of the scrambled region
        chip[0x40041] = 0x80;

        let out = sma::decrypt(vec![chip], key("garou")).unwrap();
        assert_eq!(word(&out, 2), 0x0004);
        assert_eq!(word(&out, 0x80001), 0x0008);
        assert_eq!(word(&out, 0x388080), 0x0004);
        assert_eq!(
            nonzero_words(&out),
            vec![(2, 0x0004), (0x80001, 0x0008), (0x388080, 0x0004)]
        );
    }

    #[test]
    fn test_kof99_vector() {
        let mut chip = vec![0u8; CHIP_LEN];
        chip[0x640002] = 0x01;
        chip[0x40005] = 0x80;

        let out = sma::decrypt(vec![chip], key("kof99")).unwrap();
        assert_eq!(
            nonzero_words(&out),
            vec![(2, 0x1000), (0x80001, 0x0001), (0x380001, 0x1000)]
        );
    }

    #[test]
    fn test_chips_concatenated_before_descramble() {
        let mut chip = vec![0u8; CHIP_LEN];
        chip[0x650080] = 0x01;
        chip[0x40041] = 0x80;
        let whole = sma::decrypt(vec![chip.clone()], key("garou")).unwrap();

        let second = chip.split_off(0x400000);
        let split = sma::decrypt(vec![chip, second], key("garou")).unwrap();
        assert_eq!(whole, split);
    }

    #[test]
    fn test_short_program_is_bounds_violation() {
        let result = sma::decrypt(vec![vec![0u8; 16]], key("garou"));
        assert!(matches!(result, Err(Error::BoundsViolation { .. })));

        let result = sma::decrypt(vec![vec![0u8; 0x100000]], key("kof99"));
        assert!(matches!(result, Err(Error::BoundsViolation { .. })));
    }

    #[test]
    fn test_address_base_beyond_image_is_bounds_violation() {
        let mut rom = vec![0u16; 0x100000];
        let order = key("garou").address_order;
        let result = sma::descramble_address(&mut rom, 0x710000, &order);
        assert!(matches!(result, Err(Error::BoundsViolation { .. })));
    }

    #[test]
    fn test_block_shuffle_within_block() {
        // Swapping the bottom two address lines of a four word block
        let mut order = [0u8; 24];
        for (ii, line) in order.iter_mut().enumerate().take(22) {
            *line = 23 - ii as u8;
        }
        order[22] = 0;
        order[23] = 1;

        let mut rom = vec![0u16; 0x80000 + 8];
        rom[0x80000..].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        sma::shuffle_blocks(&mut rom, 8, 16, &order).unwrap();
        assert_eq!(rom[0x80000..], [1, 3, 2, 4, 5, 7, 6, 8]);
    }

    struct Passthrough;

    impl CmcDecrypt for Passthrough {
        fn graphics_decrypt(
            &self,
            _: CmcGeneration,
            plane: &[u8],
            _: u8,
        ) -> neorom_gen::Result<Vec<u8>> {
            Ok(plane.to_vec())
        }

        fn fix_plane_derive(&self, _: &[u8], size: usize) -> neorom_gen::Result<Vec<u8>> {
            Ok(vec![0; size])
        }

        fn sound_cpu_decrypt(&self, m1: &[u8]) -> neorom_gen::Result<Vec<u8>> {
            Ok(m1.to_vec())
        }
    }

    #[test]
    fn test_populate_matches_direct_decrypt() {
        let mut chip = vec![0u8; CHIP_LEN];
        chip[0x650080] = 0x01;
        chip[0x40041] = 0x80;
        let expected = sma::decrypt(vec![chip.clone()], key("garou")).unwrap();

        let layout = TitleLayout::default().with_area(
            MemoryArea::P,
            AreaLayout::new(CHIP_LEN, vec![RomChip::new("253-p1.p1", CHIP_LEN, 0)]),
        );
        let mut streams: [Vec<Cursor<Vec<u8>>>; AREAS] = Default::default();
        streams[MemoryArea::P.index()].push(Cursor::new(chip));

        let image = neorom_gen::populate("garou", &layout, streams, &Passthrough).unwrap();
        assert_eq!(image[MemoryArea::P], expected[..]);
    }

    #[test]
    fn test_populate_without_cmc_fails_after_program() {
        let layout = TitleLayout::default().with_area(
            MemoryArea::P,
            AreaLayout::new(16, vec![RomChip::new("253-p1.p1", 16, 0)]),
        );
        let mut streams: [Vec<Cursor<Vec<u8>>>; AREAS] = Default::default();
        streams[MemoryArea::P.index()].push(Cursor::new(vec![0u8; 16]));

        match neorom_gen::populate("garou", &layout, streams, &NoCmc) {
            Err(Error::Area { area, source, .. }) => {
                assert_eq!(area, MemoryArea::P);
                assert!(matches!(*source, Error::BoundsViolation { .. }));
            }
            other => panic!("Unexpected result {other:?}"),
        }
    }
}
