use serde::{de::Error, Deserialize, Deserializer};

/// Edge costs and scores. Raw scores sum the costs of cut edges; lower is better.
pub type Cost = i64;

// The level generator writes the solver objective as a float, e.g. `-5.0`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCost {
    Int(i64),
    Float(f64),
}

impl RawCost {
    fn into_cost<E: Error>(self) -> Result<Cost, E> {
        match self {
            RawCost::Int(x) => Ok(x),
            RawCost::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 9.0e15 => {
                Ok(x as Cost)
            }
            RawCost::Float(x) => Err(E::custom(format!("cost {x} is not an integer"))),
        }
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cost, D::Error> {
    RawCost::deserialize(deserializer)?.into_cost()
}

pub fn deserialize_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Cost>, D::Error> {
    Option::<RawCost>::deserialize(deserializer)?
        .map(RawCost::into_cost)
        .transpose()
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "deserialize")]
        cost: Cost,
        #[serde(default, deserialize_with = "deserialize_option")]
        best: Option<Cost>,
    }

    #[test]
    fn integral_floats_are_accepted() {
        let w: Wrapper = serde_json::from_str(r#"{"cost": -5.0, "best": 3}"#).unwrap();
        assert_eq!(w.cost, -5);
        assert_eq!(w.best, Some(3));

        let w: Wrapper = serde_json::from_str(r#"{"cost": 7, "best": null}"#).unwrap();
        assert_eq!(w.cost, 7);
        assert_eq!(w.best, None);

        let w: Wrapper = serde_json::from_str(r#"{"cost": 0}"#).unwrap();
        assert_eq!(w.best, None);
    }

    #[test]
    fn fractional_costs_are_rejected() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"cost": 1.5}"#).is_err());
    }
}
