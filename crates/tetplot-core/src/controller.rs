//! Stateful scatter plot editing
//!
//! `ScatterController` owns the current selection, conditioning and settings.
//! Each change rebuilds the scatter model from scratch and, only if the
//! rebuild succeeds, commits the change and emits an event. A failed change
//! leaves the controller as it was.

use tetplot_data::TabularData;
use tetplot_stats::fit_line;
use tracing::{debug, warn};

use crate::conditioning::{ConditioningSet, ContinuousRule};
use crate::config::PlotSettings;
use crate::error::{PlotError, PlotResult};
use crate::events::{EventRegistry, PlotAxis, PlotEvent};
use crate::scatter::{ScatterLayout, ScatterPlot};

/// Drives a scatter plot over a borrowed dataset
pub struct ScatterController<'a> {
    data: &'a dyn TabularData,
    settings: PlotSettings,
    plot: ScatterPlot,
    events: EventRegistry,
}

impl<'a> ScatterController<'a> {
    /// Start on the first two continuous variables
    pub fn new(data: &'a dyn TabularData, settings: PlotSettings) -> PlotResult<Self> {
        settings.validate()?;
        let continuous: Vec<String> = data
            .variables()
            .into_iter()
            .filter(|v| v.is_continuous())
            .map(|v| v.name.clone())
            .collect();
        if continuous.len() < 2 {
            return Err(PlotError::NotEnoughColumns {
                required: 2,
                actual: continuous.len(),
            });
        }

        let plot = ScatterPlot::new(
            data,
            &continuous[0],
            &continuous[1],
            ConditioningSet::new(),
            settings.show_regression_line,
        )?;

        Ok(Self {
            data,
            settings,
            plot,
            events: EventRegistry::new(),
        })
    }

    pub fn plot(&self) -> &ScatterPlot {
        &self.plot
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    pub fn set_x(&mut self, variable: &str) -> PlotResult<()> {
        self.select(PlotAxis::X, variable)
    }

    pub fn set_y(&mut self, variable: &str) -> PlotResult<()> {
        self.select(PlotAxis::Y, variable)
    }

    /// Condition on a continuous variable
    pub fn add_continuous_condition(
        &mut self,
        variable: &str,
        rule: ContinuousRule,
    ) -> PlotResult<()> {
        let mut conditioning = self.plot.conditioning().clone();
        conditioning.add_continuous(self.data, variable, rule)?;
        self.apply_conditioning(conditioning)
    }

    /// Condition on a discrete variable by category label
    pub fn add_category_condition(&mut self, variable: &str, label: &str) -> PlotResult<()> {
        let mut conditioning = self.plot.conditioning().clone();
        conditioning.add_category_label(self.data, variable, label)?;
        self.apply_conditioning(conditioning)
    }

    /// Remove the condition on a variable; returns false if there was none
    pub fn remove_condition(&mut self, variable: &str) -> PlotResult<bool> {
        let mut conditioning = self.plot.conditioning().clone();
        if !conditioning.remove(variable) {
            return Ok(false);
        }
        self.apply_conditioning(conditioning)?;
        Ok(true)
    }

    pub fn clear_conditions(&mut self) -> PlotResult<()> {
        let mut conditioning = self.plot.conditioning().clone();
        conditioning.clear();
        self.apply_conditioning(conditioning)
    }

    /// Toggle the regression overlay
    pub fn set_show_regression_line(&mut self, show: bool) -> PlotResult<()> {
        let mut settings = self.settings.clone();
        settings.show_regression_line = show;
        self.set_settings(settings)
    }

    /// Replace all settings
    pub fn set_settings(&mut self, settings: PlotSettings) -> PlotResult<()> {
        settings.validate()?;
        let plot = ScatterPlot::new(
            self.data,
            self.plot.x_variable(),
            self.plot.y_variable(),
            self.plot.conditioning().clone(),
            settings.show_regression_line,
        )?;
        self.plot = plot;
        self.settings = settings;
        debug!("settings changed");
        self.events.emit(&PlotEvent::SettingsChanged {
            settings: self.settings.clone(),
        });
        self.check_overlay();
        Ok(())
    }

    /// Render with a jitterer built from the current settings
    pub fn layout(&self) -> PlotResult<ScatterLayout> {
        let mut jitterer = self.settings.jitterer();
        self.plot.render(&self.settings.frame, &mut jitterer)
    }

    fn select(&mut self, axis: PlotAxis, variable: &str) -> PlotResult<()> {
        let (x, y) = match axis {
            PlotAxis::X => (variable, self.plot.y_variable()),
            PlotAxis::Y => (self.plot.x_variable(), variable),
        };
        let plot = ScatterPlot::new(
            self.data,
            x,
            y,
            self.plot.conditioning().clone(),
            self.settings.show_regression_line,
        )?;
        self.plot = plot;
        debug!(%axis, variable, "variable selected");
        self.events.emit(&PlotEvent::VariableSelected {
            axis,
            variable: variable.to_string(),
        });
        self.check_overlay();
        Ok(())
    }

    fn apply_conditioning(&mut self, conditioning: ConditioningSet) -> PlotResult<()> {
        let plot = ScatterPlot::new(
            self.data,
            self.plot.x_variable(),
            self.plot.y_variable(),
            conditioning,
            self.settings.show_regression_line,
        )?;
        self.plot = plot;
        let conditions: Vec<String> = self
            .plot
            .conditioning()
            .iter()
            .map(|c| c.label.clone())
            .collect();
        debug!(conditions = ?conditions, points = self.plot.points().len(), "conditioning changed");
        self.events.emit(&PlotEvent::ConditioningChanged {
            conditions,
            points: self.plot.points().len(),
        });
        self.check_overlay();
        Ok(())
    }

    /// Emit `OverlaySkipped` when a requested line cannot be fit
    fn check_overlay(&mut self) {
        if !self.plot.include_line() {
            return;
        }
        if let Err(err) = fit_line(&self.plot.x_values(), &self.plot.y_values()) {
            warn!(
                x = self.plot.x_variable(),
                y = self.plot.y_variable(),
                "regression overlay unavailable: {}",
                err
            );
            self.events.emit(&PlotEvent::OverlaySkipped {
                reason: err.to_string(),
            });
        }
    }
}
