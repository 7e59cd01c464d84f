use color_eyre::Result;

use crate::lidarr::AddOutcome;
use crate::ports::{ArtistLibrary, ArtistRecommender, ArtistResolver};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Run the whole pipeline once: fetch the roster, request recommendations,
/// then resolve and add each candidate in turn.
///
/// Every failure is reported here and either aborts the run (roster,
/// recommendations) or skips a single candidate (lookup, add). Nothing
/// propagates out as an error.
pub async fn run<L, R, I>(library: &L, recommender: &R, resolver: &I) -> Result<()>
where
    L: ArtistLibrary,
    R: ArtistRecommender,
    I: ArtistResolver,
{
    let roster = match library.list_artists().await {
        Ok(roster) => roster,
        Err(error) => {
            eprintln!("{}Error fetching artist list from Lidarr: {:#}{}", RED, error, RESET);
            return Ok(());
        }
    };

    println!("Found {} existing artists in Lidarr", roster.len());
    if roster.is_empty() {
        return Ok(());
    }

    let candidates = match recommender.recommend(&roster).await {
        Ok(candidates) => candidates,
        Err(error) => {
            eprintln!("{}Error requesting recommendations: {:#}{}", RED, error, RESET);
            return Ok(());
        }
    };

    if candidates.is_empty() {
        return Ok(());
    }
    println!(
        "{}Got {} new recommended artists from OpenAI{}",
        GREEN,
        candidates.len(),
        RESET
    );

    for candidate in &candidates {
        // Exact, case-sensitive match; the model frequently recommends
        // artists the library already has.
        if roster.contains(candidate) {
            println!("{}Warning: {} is already in Lidarr{}", YELLOW, candidate, RESET);
            continue;
        }

        let guid = match resolver.resolve(candidate).await {
            Ok(Some(guid)) => guid,
            Ok(None) => {
                println!(
                    "{}Warning: Could not find guid for artist {}{}",
                    YELLOW, candidate, RESET
                );
                continue;
            }
            Err(error) => {
                log::warn!("MusicBrainz lookup failed for {}: {:#}", candidate, error);
                continue;
            }
        };

        println!("Adding artist {} ({}) to Lidarr...", candidate, guid);
        match library.add_artist(&guid, candidate).await {
            Ok(AddOutcome::Added) => println!("{}Added! ✅{}", GREEN, RESET),
            Ok(AddOutcome::Rejected(message)) => println!("{}{}{}", RED, message, RESET),
            Ok(AddOutcome::Failed(body)) => {
                println!("{}Error adding artist to Lidarr:\n{}{}", RED, body, RESET)
            }
            Err(error) => {
                eprintln!("{}Error adding artist to Lidarr: {:#}{}", RED, error, RESET)
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockArtistLibrary, MockArtistRecommender, MockArtistResolver};
    use color_eyre::eyre::eyre;

    const GUID: &str = "4e954b8d-42b4-44de-a5a0-d22a121b6dff";

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_candidate_already_in_roster_is_skipped() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let mut resolver = MockArtistResolver::new();

        library
            .expect_list_artists()
            .times(1)
            .returning(|| Ok(roster(&["Bon Iver"])));
        recommender
            .expect_recommend()
            .times(1)
            .returning(|_| Ok(roster(&["Bon Iver", "Fleet Foxes"])));
        resolver
            .expect_resolve()
            .withf(|name| name == "Fleet Foxes")
            .times(1)
            .returning(|_| Ok(Some(GUID.to_string())));
        library
            .expect_add_artist()
            .withf(|guid, name| guid == GUID && name == "Fleet Foxes")
            .times(1)
            .returning(|_, _| Ok(AddOutcome::Added));

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_unresolved_candidate_is_not_added() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let mut resolver = MockArtistResolver::new();

        library
            .expect_list_artists()
            .returning(|| Ok(roster(&["Bon Iver"])));
        recommender
            .expect_recommend()
            .returning(|_| Ok(roster(&["Xyzzyplex"])));
        resolver
            .expect_resolve()
            .withf(|name| name == "Xyzzyplex")
            .times(1)
            .returning(|_| Ok(None));
        library.expect_add_artist().times(0);

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_roster_fetch_failure_aborts_pipeline() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let resolver = MockArtistResolver::new();

        library
            .expect_list_artists()
            .times(1)
            .returning(|| Err(eyre!("connection refused")));
        recommender.expect_recommend().times(0);
        library.expect_add_artist().times(0);

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_roster_aborts_pipeline() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let resolver = MockArtistResolver::new();

        library.expect_list_artists().returning(|| Ok(vec![]));
        recommender.expect_recommend().times(0);

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_recommendation_failure_stops_before_loop() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let mut resolver = MockArtistResolver::new();

        library
            .expect_list_artists()
            .returning(|| Ok(roster(&["Bon Iver"])));
        recommender
            .expect_recommend()
            .times(1)
            .returning(|_| Err(eyre!("401 Unauthorized")));
        resolver.expect_resolve().times(0);
        library.expect_add_artist().times(0);

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_lookup_failure_skips_only_that_candidate() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let mut resolver = MockArtistResolver::new();

        library
            .expect_list_artists()
            .returning(|| Ok(roster(&["Bon Iver"])));
        recommender
            .expect_recommend()
            .returning(|_| Ok(roster(&["Broken Lookup", "Fleet Foxes"])));
        resolver
            .expect_resolve()
            .withf(|name| name == "Broken Lookup")
            .times(1)
            .returning(|_| Err(eyre!("503 Service Unavailable")));
        resolver
            .expect_resolve()
            .withf(|name| name == "Fleet Foxes")
            .times(1)
            .returning(|_| Ok(Some(GUID.to_string())));
        library
            .expect_add_artist()
            .times(1)
            .returning(|_, _| Ok(AddOutcome::Added));

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_add_is_reported_not_fatal() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let mut resolver = MockArtistResolver::new();

        library
            .expect_list_artists()
            .returning(|| Ok(roster(&["Bon Iver"])));
        recommender
            .expect_recommend()
            .returning(|_| Ok(roster(&["Fleet Foxes", "Lord Huron"])));
        resolver
            .expect_resolve()
            .times(2)
            .returning(|_| Ok(Some(GUID.to_string())));
        library
            .expect_add_artist()
            .times(2)
            .returning(|_, name| {
                if name == "Fleet Foxes" {
                    Ok(AddOutcome::Rejected("already added".to_string()))
                } else {
                    Ok(AddOutcome::Added)
                }
            });

        run(&library, &recommender, &resolver).await.unwrap();
    }

    #[tokio::test]
    async fn test_roster_passed_to_recommender_verbatim() {
        let mut library = MockArtistLibrary::new();
        let mut recommender = MockArtistRecommender::new();
        let resolver = MockArtistResolver::new();

        // Duplicates in the library survive into the prompt.
        library
            .expect_list_artists()
            .returning(|| Ok(roster(&["Bon Iver", "Bon Iver"])));
        recommender
            .expect_recommend()
            .withf(|r| r == ["Bon Iver", "Bon Iver"])
            .times(1)
            .returning(|_| Ok(vec![]));

        run(&library, &recommender, &resolver).await.unwrap();
    }
}
