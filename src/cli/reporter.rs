use batchprover_coordinator::CoordinatorResponse;
use batchprover_engine::Reporter;

/// Prints the run narrative and verbatim response bodies to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn fetch_started(&self) {
        println!("Requesting batch.");
    }

    fn batch_received(&self, response: &CoordinatorResponse) {
        println!("Received response:");
        println!("{}", response.body_text());
    }

    fn compute_started(&self, location: &str) {
        println!("Computing proof for {location}.");
    }

    fn submit_started(&self) {
        println!("Submitting proof.");
    }

    fn submit_response(&self, response: &CoordinatorResponse) {
        println!("Received response:");
        println!("{}", response.body_text());
    }
}
