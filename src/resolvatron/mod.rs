use indexmap::IndexMap;

use crate::{
    archivist::Archivist,
    interaction::Interaction,
    paramatron::{ConfigurableParam, FileGroup},
    NutshellResult,
};

/// Header shown once, right before the first question.
const CUSTOMIZATION_HEADER: &str = "Please customize your Contao nutshell.";

/// Current and accepted value of one parameter.
#[derive(Clone, PartialEq, Debug)]
pub struct ResolvedValue {
    pub current: String,
    pub accepted: String,
}

impl ResolvedValue {
    pub fn is_changed(&self) -> bool {
        self.current != self.accepted
    }
}

/// Outcome of one resolution pass, grouped by file and kept in declaration order.
///
/// Script parameters the script never assigns have no entry.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Resolution {
    values: IndexMap<FileGroup, IndexMap<ConfigurableParam, ResolvedValue>>,
}

impl Resolution {
    fn insert(&mut self, param: ConfigurableParam, value: ResolvedValue) {
        self.values
            .entry(param.file_group())
            .or_default()
            .insert(param, value);
    }

    /// Looks up the resolved value of one parameter.
    ///
    /// # Arguments
    /// - `param`: The parameter to look up; its file group selects the inner map.
    ///
    /// # Returns
    /// The current and accepted value, or `None` when the parameter was not configurable
    /// (a script variable the script never assigns).
    pub fn get(&self, param: ConfigurableParam) -> Option<&ResolvedValue> {
        self.values
            .get(&param.file_group())
            .and_then(|group| group.get(&param))
    }

    /// Every resolved parameter, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigurableParam, &ResolvedValue)> {
        self.values.values().flat_map(|group| group.iter())
    }

    /// File group -> parameter name -> accepted value.
    pub fn accepted_values(&self) -> IndexMap<FileGroup, IndexMap<String, String>> {
        self.values
            .iter()
            .map(|(group, params)| {
                let accepted = params
                    .iter()
                    .map(|(param, value)| (param.name().to_string(), value.accepted.clone()))
                    .collect::<IndexMap<_, _>>();

                (*group, accepted)
            })
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.iter().any(|(_, value)| value.is_changed())
    }
}

/// Reads the current value of every configurable parameter and, when an operator is present, asks for each one
/// in declaration order. Without an operator every accepted value equals its current value.
pub async fn resolve<I: Interaction>(
    archivist: &mut Archivist,
    interaction: &mut I,
) -> NutshellResult<Resolution> {
    tracing::info!("Resolving configurable parameters");

    let mut current_values = vec![];

    for param in ConfigurableParam::ALL {
        match param.extract(archivist).await? {
            Some(current) => current_values.push((param, current)),
            None => tracing::warn!("{} is not assigned, skipping it", param),
        }
    }

    let mut resolution = Resolution::default();
    let mut is_started = false;

    for (param, current) in current_values {
        let accepted = if interaction.is_interactive() {
            if !is_started {
                is_started = true;
                interaction.write(CUSTOMIZATION_HEADER).await?;
            }

            let prompt = format!("{} [{}]", param.explanation(), param);

            interaction.ask(&prompt, &current).await?
        } else {
            current.clone()
        };

        tracing::debug!("{} resolved: '{}' -> '{}'", param, current, accepted);

        resolution.insert(param, ResolvedValue { current, accepted });
    }

    Ok(resolution)
}
