use stampwork::{cli, ui};

fn main() {
    if let Err(err) = cli::run() {
        ui::error(&err);
        std::process::exit(1);
    }
}
