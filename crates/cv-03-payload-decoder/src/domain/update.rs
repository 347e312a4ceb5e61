//! # Update Preview Cards

use super::cards::{Card, CardContent, Trust};
use shared_types::{CandidateContent, UpdateCandidate};

/// Cards describing a registry update before the user accepts it.
pub fn update_cards(candidate: &UpdateCandidate) -> Vec<Card> {
    let mut cards = Vec::new();
    let verifier = candidate.claimed_verifier();
    if !verifier.is_pinned() {
        cards.push(Card::warning("Update is not signed; its origin cannot be verified", 0));
    }

    let mut content = match &candidate.content {
        CandidateContent::Metadata {
            name, spec_version, ..
        } => Card::new(
            CardContent::MetadataUpdate {
                name: name.clone(),
                spec_version: *spec_version,
            },
            0,
        ),
        CandidateContent::NetworkSpecs(specs) => {
            Card::new(CardContent::NetworkSpecsUpdate(specs.clone()), 0)
        }
    };
    let mut verifier_card = Card::new(CardContent::UpdateVerifier(verifier.clone()), 0);

    // The signature itself is checked by the registry before acceptance.
    let trust = if verifier.is_pinned() {
        Trust::Verified
    } else {
        Trust::Unverified
    };
    content.mark(trust);
    verifier_card.mark(trust);

    cards.push(verifier_card);
    cards.push(content);
    cards
}
