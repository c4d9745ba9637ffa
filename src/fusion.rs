//! This module splits the fused business pitch returned at the end of a fusion game into the parts
//! shown on the result screen. The pitch is free text, so the split is best-effort: whatever can't
//! be found is left empty.

/// The pitch shown when the fusion request fails altogether.
pub(crate) const FALLBACK_PITCH: &str = "### Fusion Catastrophe\nThe Merger Maestro \
short-circuited. The two business plans were so incompatible they created a paradox. Please try \
again with less reality-bending concepts.";

/// The title used when the pitch has no heading line.
const DEFAULT_TITLE: &str = "Fused Idea";

/// The prefix of the heading line holding the company name.
const TITLE_MARKER: &str = "### ";

/// The prefix of the line holding the slogan.
const SLOGAN_MARKER: &str = "**Slogan:**";

/// The lowercase text of the line opening the big idea section.
const BIG_IDEA_MARKER: &str = "the big idea";

/// The lowercase text of the line opening the business brief section.
const BRIEF_MARKER: &str = "business brief";

/// The lowercase text of the line opening the final pitch section.
const FINAL_PITCH_MARKER: &str = "final pitch";

/// This struct holds the sections of a fused pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FusedPitch {
    /// The paragraph describing the merged concept.
    pub(crate) big_idea: String,
    /// The summary of the business model.
    pub(crate) brief: String,
    /// The closing sentence.
    pub(crate) final_pitch: String,
    /// The slogan, without its marker.
    pub(crate) slogan: String,
    /// The company name.
    pub(crate) title: String,
}

impl FusedPitch {
    /// This function splits a pitch into its sections. Blank lines are dropped, each section runs
    /// from the line after its marker up to the next section marker, and a missing section is left
    /// empty.
    pub(crate) fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();

        let title = lines
            .iter()
            .find_map(|line| line.strip_prefix(TITLE_MARKER))
            .map_or(DEFAULT_TITLE, str::trim)
            .to_owned();
        let slogan = lines
            .iter()
            .find_map(|line| line.strip_prefix(SLOGAN_MARKER))
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();

        let marker = |needle: &str| {
            lines
                .iter()
                .position(|line| line.to_lowercase().contains(needle))
        };
        let markers = [
            marker(BIG_IDEA_MARKER),
            marker(BRIEF_MARKER),
            marker(FINAL_PITCH_MARKER),
        ];
        let [big_idea, brief, final_pitch] = markers;

        Self {
            big_idea: section(&lines, big_idea, &markers),
            brief: section(&lines, brief, &markers),
            final_pitch: section(&lines, final_pitch, &markers),
            slogan,
            title,
        }
    }
}

/// This function joins the lines strictly between the `start` marker and the closest marker after
/// it, or the end of the text when no marker follows.
fn section(lines: &[&str], start: Option<usize>, markers: &[Option<usize>]) -> String {
    let Some(start) = start else {
        return String::new();
    };
    let end = markers
        .iter()
        .flatten()
        .copied()
        .filter(|end| *end > start)
        .min()
        .unwrap_or(lines.len());

    lines
        .get(start + 1..end)
        .map(|body| body.join("\n").trim().to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PITCH: &str = "### PebbleHub\n\
**Slogan:** Rock solid deliveries.\n\
\n\
**The Big Idea:**\n\
A monthly box of curated rocks.\n\
Now with feelings.\n\
\n\
**Business Brief:**\n\
Subscriptions plus a rock adoption fee.\n\
\n\
**Final Pitch:**\n\
Every home deserves a pet rock.";

    #[test]
    fn parses_a_well_formed_pitch() {
        let pitch = FusedPitch::parse(PITCH);

        assert_eq!(pitch.title, "PebbleHub");
        assert_eq!(pitch.slogan, "Rock solid deliveries.");
        assert_eq!(
            pitch.big_idea,
            "A monthly box of curated rocks.\nNow with feelings."
        );
        assert_eq!(pitch.brief, "Subscriptions plus a rock adoption fee.");
        assert_eq!(pitch.final_pitch, "Every home deserves a pet rock.");
    }

    #[test]
    fn missing_sections_are_left_empty() {
        let pitch = FusedPitch::parse("Just some rambling.\n**Final Pitch:**\nBuy it.");

        assert_eq!(pitch.title, DEFAULT_TITLE);
        assert!(pitch.slogan.is_empty());
        assert!(pitch.big_idea.is_empty());
        assert!(pitch.brief.is_empty());
        assert_eq!(pitch.final_pitch, "Buy it.");
    }

    #[test]
    fn sections_stop_at_the_next_marker() {
        let pitch = FusedPitch::parse("**The Big Idea:**\nRocks.\n**Final Pitch:**\nRocks!");

        assert_eq!(pitch.big_idea, "Rocks.");
        assert_eq!(pitch.final_pitch, "Rocks!");
    }

    #[test]
    fn fallback_pitch_has_a_title() {
        let pitch = FusedPitch::parse(FALLBACK_PITCH);

        assert_eq!(pitch.title, "Fusion Catastrophe");
    }
}
