use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;

use super::actor::{Activity, Actor};
use super::questions::Question;
use super::{ScreenplayError, ScreenplayResult};

/// A named predicate over an answer
pub struct Expectation<T> {
    description: String,
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Expectation<T> {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Box::new(predicate),
        }
    }

    pub fn is_met_by(&self, actual: &T) -> bool {
        (self.predicate)(actual)
    }
}

impl<T> fmt::Display for Expectation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Expects the answer to equal `expected`
pub fn equals<T>(expected: T) -> Expectation<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    Expectation::new(format!("equal {:?}", expected), move |actual| {
        *actual == expected
    })
}

/// Verifies an answer, failing with an assertion error when it does not match
pub struct Ensure<T, Q> {
    question: Q,
    expectation: Expectation<T>,
    _answer: PhantomData<fn() -> T>,
}

impl<T, Q> Ensure<T, Q>
where
    Q: Question<T>,
{
    pub fn that(question: Q, expectation: Expectation<T>) -> Self {
        Self {
            question,
            expectation,
            _answer: PhantomData,
        }
    }
}

impl<T, Q: fmt::Display> fmt::Display for Ensure<T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ensure that {} does {}", self.question, self.expectation)
    }
}

#[async_trait]
impl<T, Q> Activity for Ensure<T, Q>
where
    T: fmt::Debug + Send + 'static,
    Q: Question<T>,
{
    async fn perform_as(&self, actor: &Actor) -> ScreenplayResult<()> {
        let actual = self.question.answered_by(actor).await?;
        if self.expectation.is_met_by(&actual) {
            return Ok(());
        }

        Err(ScreenplayError::Assertion {
            message: format!(
                "Expected {} to {}, but got {:?}",
                self.question, self.expectation, actual
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(&'static str);

    impl fmt::Display for Constant {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("the constant")
        }
    }

    #[async_trait]
    impl Question<String> for Constant {
        async fn answered_by(&self, _actor: &Actor) -> ScreenplayResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_met_expectation_passes() {
        let actor = Actor::named("Bernie");
        let ensure = Ensure::that(Constant("milk"), equals("milk".to_string()));
        actor.attempts_to(&[&ensure]).await.unwrap();
    }

    #[tokio::test]
    async fn test_unmet_expectation_is_an_assertion_error() {
        let actor = Actor::named("Bernie");
        let ensure = Ensure::that(Constant("oats"), equals("milk".to_string()));

        let err = actor.attempts_to(&[&ensure]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected the constant to equal \"milk\", but got \"oats\""
        );
        assert!(err.is_assertion());
    }

    #[test]
    fn test_description() {
        let ensure = Ensure::that(Constant("oats"), equals("oats".to_string()));
        assert_eq!(
            ensure.to_string(),
            "ensure that the constant does equal \"oats\""
        );
    }
}
