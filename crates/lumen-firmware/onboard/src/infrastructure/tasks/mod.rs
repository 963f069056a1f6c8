pub(crate) mod onboard_led;
