//! One-shot flow-sensor interrupt setup.
//!
//! The flow input is configured with raw ESP-IDF sys calls rather than
//! `PinDriver::subscribe`: the HAL's subscription disables the interrupt
//! after every edge, which would drop pulses between re-arms.  Called
//! once from `main()` before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerAddFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerAddFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

// ── Flow pulse ISR ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn flow_gpio_isr(_arg: *mut core::ffi::c_void) {
    crate::sensors::flow::flow_isr_handler();
}

/// Configure the flow input (pull-up, rising edge), install the per-pin
/// ISR service and register the pulse handler.
#[cfg(target_os = "espidf")]
pub fn init_flow_isr() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the control loop; the
    // registered handler only touches the lock-free pulse counter.
    unsafe {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pins::FLOW_PULSE_GPIO,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
            ..Default::default()
        };
        let ret = gpio_config(&cfg);
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }

        // ESP_ERR_INVALID_STATE: already installed by another driver.
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(
            pins::FLOW_PULSE_GPIO,
            Some(flow_gpio_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK {
            return Err(HwInitError::IsrHandlerAddFailed(ret));
        }
        gpio_intr_enable(pins::FLOW_PULSE_GPIO);
    }

    // Pulses seen before the loop starts belong to no interval.
    crate::sensors::flow::FLOW_PULSES.take_and_reset();
    info!("hw_init: flow ISR on GPIO{} (rising edge)", pins::FLOW_PULSE_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_flow_isr() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): flow ISR skipped");
    Ok(())
}
