/// Run configuration, built once in `main` from the CLI/environment and
/// passed explicitly into each service client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lidarr hostname without a scheme, e.g. "lidarr.example.com".
    pub lidarr_host: String,
    pub lidarr_api_key: String,
    pub openai_api_key: String,
    /// Root folder Lidarr stores newly added artists under.
    pub root_folder_path: String,
    /// Instruction text sent ahead of the artist list in the
    /// recommendation request.
    pub prompt: String,
}
