//! Long-run timing properties of the run loop.

use emu_core::Cpu;
use emu_invaders::{Invaders, InvadersConfig};
use proptest::prelude::*;

/// LXI B,0 (10); MOV B,C (5); JMP 0000 (10)
const MIXED_COST_LOOP: [u8; 7] = [0x01, 0x00, 0x00, 0x41, 0xC3, 0x00, 0x00];

proptest! {
    #[test]
    fn executed_cycles_never_drift_from_budget(budgets in prop::collection::vec(0u32..50_000, 1..40)) {
        let mut invaders =
            Invaders::new(&InvadersConfig::with_rom(MIXED_COST_LOOP.to_vec())).unwrap();

        let mut granted = 0u64;
        for budget in budgets {
            invaders.run_cycles(budget).unwrap();
            granted += u64::from(budget);

            let executed = invaders.total_cycles().get();
            prop_assert!(executed >= granted);
            prop_assert!(executed - granted < 10, "drifted {} cycles", executed - granted);
        }

        let executed = invaders.total_cycles().get();
        prop_assert_eq!(invaders.frame_count(), executed / 33_333);
        prop_assert!(!invaders.cpu().is_halted());
    }
}
