use vhostup::cli::{self, Invocation};

fn main() {
    cli::run_main(Invocation::APACHE);
}
