//! This module holds the challenge material of both game modes and the logic to pick it for a new
//! game.
//!
//! Battle mode samples its challenges out of a fixed pool, preferring the ones the player has not
//! seen before. Fusion mode always walks the same ordered list of templates, with a randomly picked
//! base concept and the company name from the first round spliced into them.

use fastrand::Rng;

/// The number of rounds every game lasts, regardless of mode.
pub(crate) const TOTAL_ROUNDS: usize = 10;

/// The token in fusion templates that gets replaced with the base concept of the game.
pub(crate) const IDEA_TOKEN: &str = "{{IDEA}}";

/// The token in fusion templates that gets replaced with the company name given in the first
/// round.
pub(crate) const NAME_TOKEN: &str = "{{NAME}}";

/// The text that stands in for the company name when the first round was left unanswered.
pub(crate) const NAME_FALLBACK: &str = "your company";

/// The pool of absurd prompts that battle mode samples its rounds from.
pub(crate) const BATTLE_CHALLENGES: &[&str] = &[
    "Invent a new sport that can only be played inside an elevator.",
    "Pitch a mobile app for pigeons.",
    "Explain why Mondays should be replaced by a second Saturday, in a way a CEO would accept.",
    "Design a restaurant where the waiters are the food critics.",
    "Come up with a slogan for a brand of invisible paint.",
    "Describe a superhero whose only power is finding lost socks.",
    "Propose a tax that would make everyone happier.",
    "Rename the moon and justify the rebrand to the public.",
    "Invent a holiday celebrating a mundane household object.",
    "Write the opening line of a TED talk given by a houseplant.",
    "Pitch a startup that sells silence by the minute.",
    "Design a museum dedicated to things nobody remembers.",
    "Describe the worst possible feature for a smart fridge, then sell it.",
    "Create a dating app for people who hate technology.",
    "Invent a board game that teaches patience to toddlers.",
    "Explain cryptocurrency to a medieval peasant.",
    "Design a uniform for professional nap takers.",
    "Propose a new unit of measurement and what it measures.",
    "Pitch a reality show set entirely inside a laundromat.",
    "Write a customer complaint from a ghost to a haunted house company.",
    "Invent a kitchen gadget nobody asked for but everyone needs.",
    "Describe a city where traffic lights are replaced by interpretive dancers.",
    "Pitch a luxury hotel for retired robots.",
    "Design a loyalty program for a public library.",
    "Come up with a way to make waiting in line fun.",
    "Invent a musical instrument made from office supplies.",
    "Explain the internet using only weather metaphors.",
    "Pitch a subscription service for bad advice.",
    "Design a theme park based on paperwork.",
    "Create a startup that turns procrastination into a profitable business.",
];

/// The ordered questions of fusion mode. Each one builds on the answers to the previous ones, so
/// they are never shuffled.
pub(crate) const FUSION_TEMPLATES: [&str; TOTAL_ROUNDS] = [
    "Your new business is built around {{IDEA}}. What is the name of your company?",
    "What is the slogan of {{NAME}}?",
    "Describe the core product or service of {{NAME}} in a few sentences.",
    "Who is the target audience of {{NAME}}, and why will they love it?",
    "What makes {{NAME}} different from every competitor out there?",
    "How does {{NAME}} make money?",
    "Describe the launch event for {{NAME}}.",
    "What is the biggest risk {{NAME}} faces, and how will you handle it?",
    "Every great company has a wild card feature. What is the wild card of {{NAME}}?",
    "Give the one-sentence elevator pitch for {{NAME}}.",
];

/// The concepts a fusion game can be built around. One of them is picked at random per game.
pub(crate) const FUSION_BASE_CONCEPTS: &[&str] = &[
    "a subscription box for rocks",
    "a social network for houseplants",
    "a gym for people who hate exercise",
    "a travel agency for time zones",
    "a bakery that only sells the crusts",
    "a dating service for socks that lost their pair",
    "a coffee shop with no coffee",
    "a rental service for imaginary friends",
    "a bank that stores memories instead of money",
    "a delivery service powered by ducks",
    "an airline for pets traveling alone",
    "a library of unfinished novels",
];

/// This struct holds the outcome of picking the challenges for a battle game.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BattleSelection {
    /// This field contains the challenges picked for the game, in play order.
    pub(crate) challenges: Vec<String>,
    /// This field tells whether the unseen pool ran dry and the selection was taken from the full
    /// pool instead, in which case the previous seen-set must be dropped.
    pub(crate) recycled: bool,
}

/// This function picks `TOTAL_ROUNDS` distinct challenges out of the given pool, only drawing from
/// the challenges missing from `seen` unless fewer than `TOTAL_ROUNDS` of those remain.
pub(crate) fn select_battle(pool: &[&str], seen: &[String], rng: &mut Rng) -> BattleSelection {
    let mut unseen: Vec<&str> = pool
        .iter()
        .copied()
        .filter(|challenge| !seen.iter().any(|old| old == challenge))
        .collect();

    let recycled = unseen.len() < TOTAL_ROUNDS;
    if recycled {
        unseen = pool.to_vec();
    }

    rng.shuffle(&mut unseen);

    BattleSelection {
        challenges: unseen
            .into_iter()
            .take(TOTAL_ROUNDS)
            .map(str::to_owned)
            .collect(),
        recycled,
    }
}

/// This function returns the fusion templates as owned challenges in their fixed order.
pub(crate) fn fusion_challenges() -> Vec<String> {
    FUSION_TEMPLATES.iter().copied().map(str::to_owned).collect()
}

/// This function picks the base concept of a fusion game.
pub(crate) fn pick_base_concept(rng: &mut Rng) -> String {
    let index = rng.usize(..FUSION_BASE_CONCEPTS.len());

    FUSION_BASE_CONCEPTS
        .get(index)
        .copied()
        .unwrap_or_default()
        .to_owned()
}

/// This function fills in the placeholder tokens of a fusion template. The name token is only
/// replaced when a name is given; callers pass `None` until the first round has been answered.
pub(crate) fn render(template: &str, base_concept: &str, name: Option<&str>) -> String {
    let text = template.replace(IDEA_TOKEN, base_concept);

    match name {
        Some(name) => text.replace(NAME_TOKEN, name),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Rng {
        Rng::with_seed(7)
    }

    #[test]
    fn battle_selection_is_distinct_and_sized() {
        let selection = select_battle(BATTLE_CHALLENGES, &[], &mut seeded());

        assert_eq!(selection.challenges.len(), TOTAL_ROUNDS);
        assert!(!selection.recycled);
        for (index, challenge) in selection.challenges.iter().enumerate() {
            assert!(
                !selection.challenges[index + 1..].contains(challenge),
                "challenge repeated: {challenge}"
            );
            assert!(BATTLE_CHALLENGES.contains(&challenge.as_str()));
        }
    }

    #[test]
    fn battle_selection_prefers_unseen() {
        let seen: Vec<String> = BATTLE_CHALLENGES
            .iter()
            .take(BATTLE_CHALLENGES.len() - TOTAL_ROUNDS)
            .map(|challenge| (*challenge).to_owned())
            .collect();

        let selection = select_battle(BATTLE_CHALLENGES, &seen, &mut seeded());

        assert!(!selection.recycled);
        assert!(selection.challenges.iter().all(|challenge| !seen.contains(challenge)));
    }

    #[test]
    fn battle_selection_recycles_exhausted_pool() {
        let seen: Vec<String> = BATTLE_CHALLENGES
            .iter()
            .take(BATTLE_CHALLENGES.len() - TOTAL_ROUNDS + 1)
            .map(|challenge| (*challenge).to_owned())
            .collect();

        let selection = select_battle(BATTLE_CHALLENGES, &seen, &mut seeded());

        assert!(selection.recycled);
        assert_eq!(selection.challenges.len(), TOTAL_ROUNDS);
    }

    #[test]
    fn recycled_selection_can_reach_the_whole_pool() {
        let seen: Vec<String> = BATTLE_CHALLENGES
            .iter()
            .map(|challenge| (*challenge).to_owned())
            .collect();
        let mut rng = seeded();
        let mut drawn: Vec<String> = Vec::new();

        for _ in 0..50 {
            for challenge in select_battle(BATTLE_CHALLENGES, &seen, &mut rng).challenges {
                if !drawn.contains(&challenge) {
                    drawn.push(challenge);
                }
            }
        }

        assert_eq!(drawn.len(), BATTLE_CHALLENGES.len());
    }

    #[test]
    fn fusion_rounds_follow_the_fixed_order() {
        let challenges = fusion_challenges();

        assert_eq!(challenges.len(), TOTAL_ROUNDS);
        assert!(challenges[0].contains(IDEA_TOKEN));
        assert!(challenges[1..].iter().all(|template| template.contains(NAME_TOKEN)));
    }

    #[test]
    fn render_substitutes_concept_and_name() {
        let concept = "a subscription box for rocks";

        let first = render(FUSION_TEMPLATES[0], concept, None);
        assert!(first.contains(concept));
        assert!(!first.contains(IDEA_TOKEN));

        let later = render(FUSION_TEMPLATES[1], concept, Some("RockBox"));
        assert_eq!(later, "What is the slogan of RockBox?");
    }

    #[test]
    fn render_keeps_name_token_without_a_name() {
        let text = render(FUSION_TEMPLATES[2], "anything", None);

        assert!(text.contains(NAME_TOKEN));
    }

    #[test]
    fn base_concept_comes_from_the_list() {
        let concept = pick_base_concept(&mut seeded());

        assert!(FUSION_BASE_CONCEPTS.contains(&concept.as_str()));
    }
}
