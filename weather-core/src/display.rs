use std::io::Write;

use tracing::warn;

use crate::model::WeatherReading;

/// Destination for readings produced by the worker.
///
/// Rendering is fire-and-forget: a sink handles its own output errors.
pub trait DisplaySink: Send {
    fn render(&mut self, reading: &WeatherReading);
}

/// Writes readings as text lines, e.g. to a serial console or stdout.
#[derive(Debug)]
pub struct ConsoleDisplay<W> {
    out: W,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_reading(&mut self, reading: &WeatherReading) -> std::io::Result<()> {
        writeln!(self.out, "Conditions: {}", reading.conditions)?;
        writeln!(self.out, "Wind:\t\t{}", reading.wind_direction)?;
        writeln!(self.out, "Rain:\t\t{} %", reading.precipitation_percent)?;
        writeln!(self.out, "Temp:\t\t{} C", reading.temperature_celsius)?;
        self.out.flush()
    }
}

impl<W: Write + Send> DisplaySink for ConsoleDisplay<W> {
    fn render(&mut self, reading: &WeatherReading) {
        if let Err(e) = self.write_reading(reading) {
            warn!(error = %e, "failed to write reading to console");
        }
    }
}

/// Sink for setups without any display attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn render(&mut self, _reading: &WeatherReading) {}
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn render(&mut self, reading: &WeatherReading) {
        (**self).render(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_prints_all_four_lines() {
        let mut display = ConsoleDisplay::new(Vec::new());
        display.render(&WeatherReading {
            conditions: "Partly cloudy".into(),
            wind_direction: "SSW".into(),
            precipitation_percent: 3,
            temperature_celsius: -2,
        });

        let text = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(
            text,
            "Conditions: Partly cloudy\nWind:\t\tSSW\nRain:\t\t3 %\nTemp:\t\t-2 C\n"
        );
    }
}
