//! Binary entrypoint for hexbuild-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    match hexbuild_cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
