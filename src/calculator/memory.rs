//! The single memory register (MC, MS, MR, M+, M-).

use super::engine::Calculator;
use super::error::Outcome;
use super::format::format_number;
use super::programmer::clamp;
use super::state::Mode;

impl Calculator {
    /// MC. Always succeeds, even in the error state.
    pub fn memory_clear(&mut self) -> Outcome {
        self.state.memory_value = 0.0;
        self.state.has_memory = false;
        self.applied()
    }

    /// MS. Overwrites memory with the current value.
    pub fn memory_store(&mut self) -> Outcome {
        self.update_memory(|_, current| current)
    }

    /// M+.
    pub fn memory_add(&mut self) -> Outcome {
        self.update_memory(|memory, current| memory + current)
    }

    /// M-.
    pub fn memory_subtract(&mut self) -> Outcome {
        self.update_memory(|memory, current| memory - current)
    }

    /// MR. Recalling an empty (zero) memory leaves the current value alone.
    pub fn memory_recall(&mut self) -> Outcome {
        if self.state.has_error || self.state.memory_value == 0.0 {
            return Outcome::Ignored;
        }

        let memory = self.state.memory_value;
        self.state.current_value = if self.state.mode == Mode::Programmer {
            self.render_bits(clamp(memory as i64, self.state.bit_length))
        } else {
            format_number(memory)
        };
        self.state.is_result_displayed = true;
        self.applied()
    }

    fn update_memory(&mut self, combine: impl FnOnce(f64, f64) -> f64) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }
        let Some(current) = self.current_number() else {
            return Outcome::Ignored;
        };

        self.state.memory_value = combine(self.state.memory_value, current);
        self.state.has_memory = self.state.memory_value != 0.0;
        self.applied()
    }
}
