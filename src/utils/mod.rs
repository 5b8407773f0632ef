pub mod countdown;
pub mod html;
pub mod throttle;
pub mod validation;
