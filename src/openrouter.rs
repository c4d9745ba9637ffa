//! This module implements the remote service on top of the OpenRouter chat completions API. It only
//! covers the bits of the API the game uses: a system prompt, a user prompt and an optional request
//! for a JSON reply.

use std::time::Duration;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::evaluation::{self, Category, EvaluationResult};
use crate::fusion::FALLBACK_PITCH;
use crate::service::{Service, ServiceError};

/// The root of the OpenRouter API.
pub(crate) const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// The model used when none is configured.
pub(crate) const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

/// The answer given in place of the opponent's when its request fails.
pub(crate) const OPPONENT_FILLER: &str = "The AI is speechless. It seems your brilliance broke it.";

/// The text standing in for a round the player left empty.
pub(crate) const NO_ANSWER: &str = "(No answer provided)";

/// The persona of the AI opponent. It is meant to be beatable.
const OPPONENT_PERSONA: &str = "You are the AI opponent in a creativity game. Give a simple, \
literal and basic answer to the challenge. Avoid cleverness, humor and deep thinking, so the human \
player stands a fair chance. Your whole answer must fit in three lines of text.";

/// The persona of the judge of battle games.
const JUDGE_PERSONA: &str = "You are an impartial judge of innovation, cognitive science and \
business strategy. You score a human and an AI called IdeaGPT on their answers to a series of \
creative challenges. You reply with a single JSON object and nothing else.";

/// The persona that merges the two business plans of a fusion game.
const FUSION_PERSONA: &str = "You are the Merger Maestro, a business consultant who fuses two \
competing business plans into a single, superior and wildly creative venture.";

#[expect(
    clippy::arbitrary_source_item_ordering,
    reason = "The JSON schema needs the fields to be in this order."
)]
/// This struct holds a single message of a chat completion request.
#[derive(Serialize)]
struct Message {
    /// The author of the message.
    role: Role,
    /// The text of the message.
    content: String,
}

impl Message {
    /// This function creates a new message.
    fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_owned(),
        }
    }
}

/// This struct holds the body of a chat completion request.
#[derive(Serialize)]
struct Request<'body> {
    /// The conversation so far; always a system message followed by a user message.
    messages: Vec<Message>,
    /// The model that should answer.
    model: &'body str,
    /// The format the reply is constrained to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl<'body> Request<'body> {
    /// This function creates a request made of a system prompt and a user prompt.
    fn new(model: &'body str, system: &str, user: &str, json: bool) -> Self {
        Self {
            messages: vec![
                Message::new(Role::System, system),
                Message::new(Role::User, user),
            ],
            model,
            response_format: json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

/// This struct asks the model to constrain its reply to a format.
#[derive(Serialize)]
struct ResponseFormat {
    /// The name of the format.
    #[serde(rename = "type")]
    kind: &'static str,
}

/// This struct holds the part of a chat completion response the game reads.
#[derive(Deserialize)]
struct Response {
    /// The generated replies; the game only reads the first one.
    choices: Vec<ResponseChoice>,
}

/// This struct holds a single generated reply.
#[derive(Deserialize)]
struct ResponseChoice {
    /// The reply itself.
    message: ResponseMessage,
}

/// This struct holds the text of a generated reply.
#[derive(Deserialize)]
struct ResponseMessage {
    /// The text; OpenRouter sends `null` while a model is still warming up.
    #[serde(default)]
    content: Option<String>,
}

/// This enum holds the authors a message may have.
#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    /// The system prompt.
    System,
    /// The user prompt.
    User,
}

/// This struct holds what is needed to reach the OpenRouter API.
#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    /// The root of the API, without a trailing slash.
    pub(crate) api_base: String,
    /// The bearer token.
    pub(crate) api_key: String,
    /// The model that answers every request.
    pub(crate) model: String,
    /// The timeout applied to each request as a whole.
    pub(crate) timeout: Duration,
    /// Whether the proxy named in the environment, if any, is used.
    pub(crate) use_env_proxy: bool,
}

/// This struct is the OpenRouter-backed implementation of the remote service.
pub(crate) struct OpenRouter {
    /// The HTTP agent, shared by every request.
    agent: Agent,
    /// The connection settings.
    config: ServiceConfig,
}

impl OpenRouter {
    /// This function creates a client out of the given settings.
    pub(crate) fn new(mut config: ServiceConfig) -> Self {
        let mut builder = Agent::config_builder().timeout_global(Some(config.timeout));
        if !config.use_env_proxy {
            builder = builder.proxy(None);
        }
        let agent_config = builder.build();
        config.api_base = config.api_base.trim_end_matches('/').to_owned();

        Self {
            agent: Agent::new_with_config(agent_config),
            config,
        }
    }

    /// This function sends a single chat completion request and returns the text of the first
    /// reply.
    fn complete(&self, system: &str, user: &str, json: bool) -> Result<String, ServiceError> {
        let body = Request::new(&self.config.model, system, user, json);
        debug!("sending a completion request to {}", self.config.model);

        let response: Response = self
            .agent
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send_json(&body)?
            .into_body()
            .read_json()?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ServiceError::EmptyResponse)
    }
}

impl Service for OpenRouter {
    fn evaluate(
        &self,
        challenges: &[String],
        user_answers: &[String],
        ai_answers: &[String],
    ) -> Result<EvaluationResult, ServiceError> {
        let prompt = judge_prompt(challenges, user_answers, ai_answers);
        let reply = self.complete(JUDGE_PERSONA, &prompt, true)?;

        evaluation::parse(&reply).map_err(|err| {
            error!("the judge replied with an invalid scorecard: {err}");
            err.into()
        })
    }

    fn fuse(&self, user_answers: &[String], ai_answers: &[String]) -> Result<String, ServiceError> {
        let prompt = fusion_prompt(user_answers, ai_answers);

        Ok(self
            .complete(FUSION_PERSONA, &prompt, false)
            .unwrap_or_else(|err| {
                warn!("fusing the ideas failed, using the fallback pitch: {err}");
                FALLBACK_PITCH.to_owned()
            }))
    }

    fn opponent_answer(&self, prompt: &str) -> Result<String, ServiceError> {
        let prompt = format!("Challenge: \"{prompt}\"");

        Ok(self
            .complete(OPPONENT_PERSONA, &prompt, false)
            .unwrap_or_else(|err| {
                warn!("the opponent could not answer, using the filler answer: {err}");
                OPPONENT_FILLER.to_owned()
            }))
    }
}

/// This function returns the answer as sent to the service, with empty answers made explicit.
fn shown(answer: &str) -> &str {
    if answer.trim().is_empty() {
        NO_ANSWER
    } else {
        answer
    }
}

/// This function numbers the answers of one side of a fusion game, one per line.
fn numbered(answers: &[String]) -> String {
    answers
        .iter()
        .enumerate()
        .map(|(index, answer)| format!("{}. {}", index + 1, shown(answer)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// This function builds the prompt asking the judge to score a battle game.
fn judge_prompt(challenges: &[String], user_answers: &[String], ai_answers: &[String]) -> String {
    let rounds = challenges
        .iter()
        .enumerate()
        .map(|(index, challenge)| {
            let user = user_answers.get(index).map_or(NO_ANSWER, |answer| shown(answer));
            let ai = ai_answers.get(index).map_or(NO_ANSWER, |answer| shown(answer));
            format!(
                "--- ROUND {} ---\nChallenge: \"{challenge}\"\nHuman's answer: \"{user}\"\n\
IdeaGPT's answer: \"{ai}\"\n",
                index + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let categories = Category::ALL
        .iter()
        .map(|category| format!("- {}", category.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Score the Human and IdeaGPT from 0.0 to 10.0 in every one of the {count} rounds below, on \
each of these categories:\n{categories}\n\n{rounds}\n\
Reply with a JSON object of the shape {{\"scorecard\": [{{\"category\": string, \"userScore\": \
number, \"aiScore\": number, \"winner\": \"YOU\" | \"IdeaGPT\" | \"TIE\"}}], \"verdict\": string}}. \
The scorecard holds exactly one entry per category, in the order listed above, with the category \
name written exactly as listed. Each score is the average over all rounds, rounded to one decimal. \
The winner is \"YOU\" when the Human's score is higher, \"IdeaGPT\" when the AI's is higher and \
\"TIE\" otherwise. The verdict is a short, punchy conclusion declaring the overall winner.",
        count = challenges.len()
    )
}

/// This function builds the prompt asking for the two business plans of a fusion game to be merged.
fn fusion_prompt(user_answers: &[String], ai_answers: &[String]) -> String {
    format!(
        "A Human and an AI each answered the same sequence of questions to build a business plan \
(name, slogan, core idea and so on). Take the strongest parts of each plan and fuse them into \
one cohesive business.\n\n--- The Human's Plan ---\n{}\n\n--- The AI's Plan ---\n{}\n\n\
Reply with the fused pitch only, in exactly this structure:\n\n\
### [Fused Company Name]\n**Slogan:** [Fused Slogan]\n\n**The Big Idea:**\n[One paragraph]\n\n\
**Business Brief:**\n[Business model and wild card feature]\n\n**Final Pitch:**\n[One sentence]",
        numbered(user_answers),
        numbered(ai_answers)
    )
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead as _, BufReader, Read as _, Write as _};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// This function serves a single HTTP response on a local port and hands back the raw request
    /// it received.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
Connection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut length = 0;
            loop {
                let mut line = String::new();
                let _ = reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_lowercase().strip_prefix("content-length:") {
                    length = value.trim().parse().unwrap();
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();
            request.push_str(&String::from_utf8(body).unwrap());
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            request
        });

        (base, handle)
    }

    fn client(api_base: String) -> OpenRouter {
        OpenRouter::new(ServiceConfig {
            api_base,
            api_key: "test-key".to_owned(),
            model: "test/model".to_owned(),
            timeout: Duration::from_secs(5),
            use_env_proxy: false,
        })
    }

    fn completion(content: &str) -> String {
        serde_json::json!({ "choices": [{ "message": { "content": content } }] }).to_string()
    }

    fn answers(prefix: &str) -> Vec<String> {
        (1..=3).map(|n| format!("{prefix} {n}")).collect()
    }

    #[test]
    fn request_body_matches_the_api() {
        let body = serde_json::to_value(Request::new("m", "sys", "usr", true)).unwrap();

        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["response_format"]["type"], "json_object");

        let plain = serde_json::to_value(Request::new("m", "sys", "usr", false)).unwrap();
        assert!(plain.get("response_format").is_none());
    }

    #[test]
    fn opponent_answer_reads_the_first_choice() {
        let (base, server) = serve_once("200 OK", &completion("A rock. With a hat."));

        let answer = client(base).opponent_answer("Invent a hat").unwrap();
        let request = server.join().unwrap();

        assert_eq!(answer, "A rock. With a hat.");
        assert!(request.starts_with("POST /chat/completions"));
        assert!(request.contains("Bearer test-key"));
        assert!(request.contains("Invent a hat"));
    }

    #[test]
    fn opponent_failure_yields_the_filler() {
        let (base, server) = serve_once("500 Internal Server Error", "{}");

        let answer = client(base).opponent_answer("Anything").unwrap();
        let _ = server.join().unwrap();

        assert_eq!(answer, OPPONENT_FILLER);
    }

    #[test]
    fn empty_completion_yields_the_filler() {
        let (base, server) = serve_once("200 OK", &completion("   "));

        let answer = client(base).opponent_answer("Anything").unwrap();
        let _ = server.join().unwrap();

        assert_eq!(answer, OPPONENT_FILLER);
    }

    #[test]
    fn fusion_failure_yields_the_fallback_pitch() {
        let (base, server) = serve_once("503 Service Unavailable", "{}");

        let pitch = client(base).fuse(&answers("u"), &answers("a")).unwrap();
        let _ = server.join().unwrap();

        assert_eq!(pitch, FALLBACK_PITCH);
    }

    #[test]
    fn evaluation_parses_a_fenced_scorecard() {
        let scorecard = serde_json::json!({
            "scorecard": Category::ALL.iter().map(|category| serde_json::json!({
                "category": category.label(),
                "userScore": 6.0,
                "aiScore": 4.0,
                "winner": "YOU",
            })).collect::<Vec<_>>(),
            "verdict": "Human supremacy.",
        });
        let reply = format!("```json\n{scorecard}\n```");
        let (base, server) = serve_once("200 OK", &completion(&reply));

        let result = client(base)
            .evaluate(&answers("c"), &answers("u"), &answers("a"))
            .unwrap();
        let request = server.join().unwrap();

        assert_eq!(result.scorecard.len(), 5);
        assert_eq!(result.verdict, "Human supremacy.");
        assert!(request.contains("json_object"));
    }

    #[test]
    fn evaluation_failures_are_propagated() {
        let (base, server) = serve_once("401 Unauthorized", "{}");
        let denied = client(base).evaluate(&answers("c"), &answers("u"), &answers("a"));
        let _ = server.join().unwrap();
        assert!(matches!(denied, Err(ServiceError::InvalidCredentials)));

        let (base, server) = serve_once("200 OK", &completion(r#"{"scorecard":[],"verdict":"x"}"#));
        let malformed = client(base).evaluate(&answers("c"), &answers("u"), &answers("a"));
        let _ = server.join().unwrap();
        assert!(matches!(malformed, Err(ServiceError::Malformed(_))));
    }

    #[test]
    fn prompts_spell_out_empty_answers() {
        let user = vec!["RockBox".to_owned(), String::new()];
        let ai = vec!["Stones Inc".to_owned(), "Rocks rock".to_owned()];

        let fusion = fusion_prompt(&user, &ai);
        assert!(fusion.contains("1. RockBox"));
        assert!(fusion.contains(&format!("2. {NO_ANSWER}")));

        let challenges = vec!["Name it".to_owned(), "Slogan it".to_owned()];
        let judge = judge_prompt(&challenges, &user, &ai);
        assert!(judge.contains("--- ROUND 2 ---"));
        assert!(judge.contains(NO_ANSWER));
        assert!(judge.contains(Category::EmotionalIntelligence.label()));
    }
}
