use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Opens the default output device and keeps it pulling samples from
/// `fill` for the rest of the program. Any failure along the way only
/// logs; the runtime keeps going without sound.
pub fn start_audio_playback<F: FnMut(&mut [i16]) + 'static + Send>(fill: F) {
    let host = cpal::default_host();

    let device = match host.default_output_device() {
        Some(device) => device,
        None => {
            log::warn!("no audio output device, running silent");
            return;
        }
    };

    let supported = match device.supported_output_configs() {
        Ok(mut configs) => match configs.next() {
            Some(config) => config.with_max_sample_rate(),
            None => {
                log::warn!("no supported audio output config, running silent");
                return;
            }
        },
        Err(e) => {
            log::warn!("querying audio output configs failed: {}", e);
            return;
        }
    };

    let sample_format = supported.sample_format();
    let config = supported.config();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32, F>(&device, &config, fill),
        cpal::SampleFormat::I16 => build_stream::<i16, F>(&device, &config, fill),
        cpal::SampleFormat::U16 => build_stream::<u16, F>(&device, &config, fill),
    };

    match stream {
        Ok(stream) => {
            if let Err(e) = stream.play() {
                log::warn!("starting audio stream failed: {}", e);
                return;
            }
            // the stream stops on drop; leak it so output runs for the
            // program lifetime
            std::mem::forget(stream);
        }
        Err(e) => log::warn!("building audio stream failed: {}", e),
    }
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut fill: F,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::Sample,
    F: FnMut(&mut [i16]) + 'static + Send,
{
    let mut intermediate_buffer = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            intermediate_buffer.clear();
            intermediate_buffer.resize(data.len(), 0);
            fill(&mut intermediate_buffer);
            for (out, sample) in data.iter_mut().zip(intermediate_buffer.drain(0..)) {
                *out = cpal::Sample::from::<i16>(&sample);
            }
        },
        |e| log::error!("audio stream error: {}", e),
    )
}
