use dotenv::dotenv;

/// Load `.env` from the current working directory, then layer `.env.local` on top.
/// Falls back to the project root when neither file is present in the cwd.
pub fn ensure_dotenv() {
    let found_env = dotenv().is_ok();
    // dotenv never overrides variables that are already set, so `.env.local`
    // only fills in what `.env` and the process environment left unset.
    let found_local = dotenv::from_filename(".env.local").is_ok();
    if found_env || found_local {
        return;
    }
    // Fallback to Cargo project root
    let root = env!("CARGO_MANIFEST_DIR");
    let _ = dotenv::from_filename(format!("{}/.env", root));
    let _ = dotenv::from_filename(format!("{}/.env.local", root));
}
