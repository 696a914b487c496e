pub mod chart_state;
pub mod test_run;
pub mod view_window;
