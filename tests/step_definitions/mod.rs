pub mod report_steps;
