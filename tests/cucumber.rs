mod common;
mod step_definitions;

use cucumber::World;

use step_definitions::report_steps::ReportWorld;

#[tokio::main]
async fn main() {
    ReportWorld::run("features").await;
}
