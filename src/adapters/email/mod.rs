pub mod resend;
